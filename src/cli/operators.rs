use crate::errors::SeedError;
use crate::operators::registry::OPERATOR_ALIASES;
use crate::operators::OPERATOR_REGISTRY;

pub fn handle_operators() -> Result<(), SeedError> {
    println!("{}", render_operator_table()?);
    Ok(())
}

pub fn render_operator_table() -> Result<String, SeedError> {
    let mut out = format!("{:<34} {:<10} {}\n", "OPERATOR", "KIND", "DESCRIPTION");
    for def in OPERATOR_REGISTRY.iter() {
        let operator = (def.build)()?;
        out.push_str(&format!(
            "{:<34} {:<10} {}\n",
            def.name.as_str(),
            def.kind.as_str(),
            operator.description()
        ));
    }
    for (alias, targets) in OPERATOR_ALIASES {
        let names: Vec<_> = targets.iter().map(|t| t.as_str()).collect();
        out.push_str(&format!("{:<34} {:<10} runs {}\n", alias, "alias", names.join(", ")));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::OperatorName;

    #[test]
    fn test_table_lists_every_operator_and_alias() {
        let table = render_operator_table().unwrap();
        for name in OperatorName::ALL {
            assert!(table.contains(name.as_str()));
        }
        assert!(table.contains("TapjackingFullOcclusion "));
        assert!(table.contains("runs TapjackingFullOcclusionXml, TapjackingFullOcclusionJava"));
    }
}
