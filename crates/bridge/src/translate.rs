//! Tool-to-skill translation.
//!
//! Translation is a pure function of the source catalog. The skill id is the
//! tool name itself, which makes the mapping stable, idempotent, and
//! bijective for a well-formed catalog (unique tool names). Re-running
//! discovery against an unchanged catalog reproduces the same skill set
//! byte for byte.

use skillbridge_core::types::{SkillDescriptor, ToolDescriptor};

/// Translate one tool descriptor into its skill image.
pub fn translate_tool(tool: &ToolDescriptor) -> SkillDescriptor {
    SkillDescriptor {
        id: tool.name.clone(),
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters.clone(),
        invocation_target: tool.name.clone(),
    }
}

/// Translate a whole catalog, preserving order.
pub fn translate_catalog(tools: &[ToolDescriptor]) -> Vec<SkillDescriptor> {
    tools.iter().map(translate_tool).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbridge_core::types::ParameterSpec;
    use std::collections::HashSet;

    fn sample_catalog() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new(
                "add_numbers",
                "Add two numbers together",
                vec![
                    ParameterSpec::required_integer("a", "First number"),
                    ParameterSpec::required_integer("b", "Second number"),
                ],
            ),
            ToolDescriptor::new(
                "get_leave_balance",
                "Check leave balance",
                vec![ParameterSpec::required_string("employee_id", "Employee")],
            ),
            ToolDescriptor::new("list_employees", "List employees", vec![]),
        ]
    }

    #[test]
    fn one_skill_per_tool_no_duplicates() {
        let catalog = sample_catalog();
        let skills = translate_catalog(&catalog);

        assert_eq!(skills.len(), catalog.len());
        let ids: HashSet<&str> = skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), skills.len());
    }

    #[test]
    fn translation_is_deterministic() {
        let catalog = sample_catalog();
        assert_eq!(translate_catalog(&catalog), translate_catalog(&catalog));
    }

    #[test]
    fn parameters_survive_field_by_field() {
        let skills = translate_catalog(&sample_catalog());
        let add = &skills[0];

        assert_eq!(add.id, "add_numbers");
        assert_eq!(add.invocation_target, "add_numbers");
        assert_eq!(add.parameters.len(), 2);
        assert!(add.parameters.iter().all(|p| p.required));
    }

    #[test]
    fn catalog_order_is_preserved() {
        let skills = translate_catalog(&sample_catalog());
        let ids: Vec<&str> = skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["add_numbers", "get_leave_balance", "list_employees"]);
    }
}
