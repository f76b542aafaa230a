//! `agentdir tools`: show what the agent can do.

use agentdir_tools::FsToolKind;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        // The root only matters when a tool executes.
        let registry = agentdir_tools::default_registry(".")?;
        println!("{}", serde_json::to_string_pretty(&registry.describe())?);
    } else {
        for kind in FsToolKind::ALL {
            println!("{}", describe(kind));
        }
    }
    Ok(())
}

/// Render one tool with its parameters in declared order.
fn describe(kind: FsToolKind) -> String {
    let mut out = format!("{}\n    {}\n", kind.name(), kind.description());
    for param in kind.params() {
        let note = match &param.default {
            Some(default) => format!(" = {default}"),
            None if param.required => String::new(),
            None => " (optional)".to_string(),
        };
        out.push_str(&format!(
            "    - {}: {}{note}\n",
            param.name,
            param.kind.as_str()
        ));
    }
    out
}
