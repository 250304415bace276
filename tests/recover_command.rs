use seed_vulns::materializer::fs_ops::copy_dir_all;
use seed_vulns::materializer::journal::{backup_path, journal_path, SwapJournal, SwapState};
use seed_vulns::materializer::{recover, Materializer};
use std::fs;
use tempfile::TempDir;

fn create_working_fixture(dir: &TempDir) -> std::path::PathBuf {
    let working = dir.path().join("out_HardcodedSecret");
    fs::create_dir_all(working.join("src")).unwrap();
    fs::write(working.join("src/A.java"), "class A {}").unwrap();
    working
}

#[test]
fn test_recover_without_journal() {
    let dir = TempDir::new().unwrap();
    let working = create_working_fixture(&dir);
    assert_eq!(recover(&working).unwrap(), None);
}

#[test]
fn test_recover_interrupted_swap() {
    let dir = TempDir::new().unwrap();
    let working = create_working_fixture(&dir);
    let output = dir.path().join("out_HardcodedSecret_0");

    // crash after the mutated tree became the indexed output, before the
    // backup was moved back
    let mut journal = SwapJournal::begin(&working, &output, &working.join("src/A.java"), 0).unwrap();
    copy_dir_all(&working, &backup_path(&working)).unwrap();
    journal.advance(SwapState::MutatedInPlace).unwrap();
    fs::write(working.join("src/A.java"), "class A { String KEY; }").unwrap();
    fs::rename(&working, &output).unwrap();
    journal.advance(SwapState::IndexedOutput).unwrap();

    assert_eq!(recover(&working).unwrap(), Some(SwapState::IndexedOutput));
    assert_eq!(fs::read_to_string(working.join("src/A.java")).unwrap(), "class A {}");
    assert!(!journal_path(&working).exists());
    assert!(!backup_path(&working).exists());

    // a second pass finds nothing to do
    assert_eq!(recover(&working).unwrap(), None);
    let materializer = Materializer::open(&working).unwrap();
    assert_eq!(materializer.working(), working.as_path());
}
