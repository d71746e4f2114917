use std::path::Path;

use crate::io::project_io;

/// Create `.openissue/` in `root`. Does not walk up: a nested project is allowed.
pub fn cmd_init(root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let project = project_io::init_project(root)?;
    if json {
        println!(
            "{}",
            serde_json::json!({ "dataDir": project.data_dir.display().to_string() })
        );
    } else {
        println!("Initialized openissue project in {}", project.data_dir.display());
        println!("Remote mode: {}", project.config.remote.mode.as_str());
    }
    Ok(())
}
