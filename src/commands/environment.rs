//! Environment command: report the version control tools found on this
//! machine. Missing tools are reported, not treated as failures.

use anyhow::Result;

use crate::cli::Context;
use subfetch::backend::{self, KINDS};
use subfetch::output::project_line;

/// Execute the `environment` command.
pub fn execute(context: &Context) -> Result<()> {
    println!("subfetch {}", env!("CARGO_PKG_VERSION"));
    for kind in KINDS {
        let Some(tool) = backend::create(kind, "") else {
            continue;
        };
        let info = match tool.list_tool_info() {
            Ok(info) => info.lines().next().unwrap_or_default().to_string(),
            Err(e) => {
                log::debug!("{} unavailable: {}", kind, e);
                "<not available>".to_string()
            }
        };
        println!("{}", project_line(&context.output, kind, &info));
    }
    Ok(())
}
