//! # Tool Path Resolver
//!
//! This module handles finding the external compressor in different environments:
//! - Explicit path from configuration
//! - Tools directory pointed to by `TOOLS_DIR`
//! - System PATH

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tool path resolver for different deployment environments
pub struct ToolPathResolver {
    /// Directory where tools are bundled
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a new path resolver
    pub fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR")
            .map(PathBuf::from)
            .filter(|path| path.is_dir());

        if let Some(ref dir) = tools_dir {
            debug!("Found tools directory via TOOLS_DIR: {:?}", dir);
        }

        Self { tools_dir }
    }

    /// Resolver restricted to `tools_dir` and the system PATH
    pub fn with_tools_dir(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: Some(tools_dir.into()),
        }
    }

    /// Resolve the path to a specific tool
    ///
    /// Anything that looks like a path (more than one component) is taken as-is.
    pub fn resolve_tool(&self, tool: &Path) -> Option<PathBuf> {
        debug!("Resolving tool: {:?}", tool);

        if tool.components().count() > 1 {
            return tool.is_file().then(|| tool.to_path_buf());
        }

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled_path = tools_dir.join(with_exe_extension(tool));
            if bundled_path.is_file() {
                debug!("Using bundled tool: {:?} -> {:?}", tool, bundled_path);
                return Some(bundled_path);
            }
        }

        if let Some(system_path) = self.find_in_system_path(tool) {
            debug!("Using system tool: {:?} -> {:?}", tool, system_path);
            return Some(system_path);
        }

        warn!("Tool not found: {:?}", tool);
        None
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool: &Path) -> Option<PathBuf> {
        let tool_with_ext = with_exe_extension(tool);
        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool: &Path) -> bool {
        self.resolve_tool(tool).is_some()
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool: &Path) -> Result<PathBuf, String> {
        if let Some(path) = self.resolve_tool(tool) {
            return Ok(path);
        }

        let name = tool.to_string_lossy();
        if cfg!(target_os = "linux") {
            Err(format!(
                "Tool '{}' not found in system PATH.\n\
                To install on Linux, run:\n  {}",
                name,
                install_instructions(&name)
            ))
        } else {
            Err(format!(
                "Tool '{}' not found. Please ensure it's installed or set TOOLS_DIR.",
                name
            ))
        }
    }

    /// Get a report of tool availability
    pub fn get_tools_report(&self, tool: &Path) -> String {
        let mut report = String::from("Tool Path Resolver Report\n");
        report.push_str(&format!("Tools dir: {:?}\n", self.tools_dir));
        match self.check_tool_with_instructions(tool) {
            Ok(path) => report.push_str(&format!("  ✅ {} -> {:?}\n", tool.display(), path)),
            Err(msg) => report.push_str(&format!("  ❌ {}\n", msg)),
        }
        report
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn with_exe_extension(tool: &Path) -> PathBuf {
    if cfg!(windows) && tool.extension().is_none() {
        tool.with_extension("exe")
    } else {
        tool.to_path_buf()
    }
}

/// Get installation instructions for a tool on Linux
fn install_instructions(tool_name: &str) -> String {
    match tool_name {
        "pngquant" => "sudo apt-get install pngquant".to_string(),
        _ => format!("sudo apt-get install {}", tool_name),
    }
}
