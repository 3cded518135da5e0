//! # Tool Path Resolver
//!
//! This module handles finding the external compression tools:
//! - A configured tools directory (`Config::tools_dir` or `PDF_TOOLS_DIR`)
//! - A `tools/` directory shipped next to the executable
//! - System-installed tools on the `PATH`

use crate::strategy::ToolFamily;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the tools directory
pub const TOOLS_DIR_ENV: &str = "PDF_TOOLS_DIR";

/// Tool path resolver for different deployment environments
#[derive(Debug, Clone, Default)]
pub struct ToolPathResolver {
    /// Directory searched before the system PATH
    tools_dir: Option<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver, preferring an explicitly configured tools directory
    pub fn new(configured_dir: Option<&Path>) -> Self {
        let tools_dir = configured_dir
            .map(Path::to_path_buf)
            .or_else(Self::detect_bundled_tools_dir);
        Self { tools_dir }
    }

    /// Create a resolver with an explicit tools directory; PATH is still searched afterwards
    pub fn with_tools_dir(dir: impl Into<PathBuf>) -> Self {
        Self { tools_dir: Some(dir.into()) }
    }

    /// Detect a tools directory from the environment or the executable location
    fn detect_bundled_tools_dir() -> Option<PathBuf> {
        if let Ok(tools_dir) = env::var(TOOLS_DIR_ENV) {
            let tools_path = PathBuf::from(tools_dir);
            debug!("Checking {} environment variable: {:?}", TOOLS_DIR_ENV, tools_path);
            if tools_path.is_dir() {
                return Some(tools_path);
            }
        }

        let exe_path = env::current_exe().ok()?;
        let tools_path = exe_path.parent()?.join("tools");
        if tools_path.is_dir() {
            debug!("Found bundled tools directory: {:?}", tools_path);
            return Some(tools_path);
        }

        None
    }

    /// Resolve the path to a specific executable
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        if let Some(ref tools_dir) = self.tools_dir {
            let bundled_path = tools_dir.join(executable_name(tool_name));
            if bundled_path.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled_path);
                return Some(bundled_path);
            }
        }

        if let Some(system_path) = self.find_in_system_path(tool_name) {
            debug!("Using system tool: {} -> {:?}", tool_name, system_path);
            return Some(system_path);
        }

        debug!("Tool not found: {}", tool_name);
        None
    }

    /// Resolve the first installed executable of a tool family
    pub fn resolve_family(&self, family: ToolFamily) -> Option<PathBuf> {
        family.binary_names().iter().find_map(|name| self.resolve_tool(name))
    }

    /// Find tool in system PATH
    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = executable_name(tool_name);
        let path_var = env::var_os("PATH")?;
        env::split_paths(&path_var)
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Get a report of tool availability
    pub fn get_tools_report(&self) -> String {
        let mut report = String::new();
        report.push_str("Tool Path Resolver Report\n");
        report.push_str(&format!("Tools dir: {:?}\n", self.tools_dir));
        report.push_str("\nTool Availability:\n");

        for family in ToolFamily::ALL {
            match self.resolve_family(family) {
                Some(path) => {
                    report.push_str(&format!("  ✅ {} -> {:?}\n", family, path));
                }
                None => {
                    report.push_str(&format!(
                        "  ❌ {} (install with: {})\n",
                        family,
                        family.install_hint()
                    ));
                }
            }
        }

        report
    }
}

fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}
