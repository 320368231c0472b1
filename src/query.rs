use anyhow::{bail, Context, Result};
use std::process::Command;

use crate::config::Config;
use crate::job::JobState;

/// Source of raw status text from the backup platform.
///
/// The production implementation shells out to the platform's PowerShell
/// interface; tests substitute canned output so classification logic runs
/// without spawning anything.
pub trait StatusQuery {
    /// Rows for jobs whose last result matches `state`.
    fn fetch_by_result(&self, config: &Config, state: JobState) -> Result<String>;

    /// Rows for currently executing jobs, with elapsed minutes in a
    /// trailing Duration column.
    fn fetch_running(&self, config: &Config) -> Result<String>;
}

/// Queries the platform through `powershell -Command`. Calls are
/// synchronous with no timeout, so a hung query stalls the poll cycle
/// until the subprocess errors or returns.
pub struct PowerShellQuery;

impl PowerShellQuery {
    fn run_script(&self, script: &str) -> Result<String> {
        let output = Command::new("powershell")
            .arg("-Command")
            .arg(script)
            .output()
            .context("Failed to execute powershell")?;

        if !output.status.success() {
            bail!(
                "powershell exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl StatusQuery for PowerShellQuery {
    fn fetch_by_result(&self, config: &Config, state: JobState) -> Result<String> {
        self.run_script(&result_script(config, state))
    }

    fn fetch_running(&self, config: &Config) -> Result<String> {
        self.run_script(&running_script(config))
    }
}

/// Script selecting jobs by their LastResult label.
fn result_script(config: &Config, state: JobState) -> String {
    let mut script = format!("Import-Module {}\n", config.powershell_module);
    if !config.server_address.is_empty() {
        script.push_str(&format!(
            "$server = Connect-VBRServer -Server {}\n",
            config.server_address
        ));
    }
    script.push_str(&format!(
        "Get-VBRJob | Where-Object {{$_.LastResult -eq \"{}\"}} | Select-Object Name,LastResult,LastStart,LastEnd,Description | ConvertTo-Csv -NoTypeInformation\n",
        state.label()
    ));
    if !config.server_address.is_empty() {
        script.push_str("Disconnect-VBRServer\n");
    }
    script
}

/// Script selecting currently executing jobs. Status, EndTime and
/// Description are synthesized columns; Duration is the elapsed minutes
/// since the job's last session started. Threshold filtering happens on
/// our side, not in the script.
fn running_script(config: &Config) -> String {
    let mut script = format!("Import-Module {}\n", config.powershell_module);
    if !config.server_address.is_empty() {
        script.push_str(&format!(
            "$server = Connect-VBRServer -Server {}\n",
            config.server_address
        ));
    }
    script.push_str(
        "Get-VBRJob | Where-Object {$_.IsRunning -eq $true} | Select-Object Name,\
@{Name=\"Status\";Expression={\"Running\"}},\
@{Name=\"StartTime\";Expression={$_.FindLastSession().CreationTime}},\
@{Name=\"EndTime\";Expression={\"N/A\"}},\
@{Name=\"Description\";Expression={\"Currently running\"}},\
@{Name=\"Duration\";Expression={((Get-Date) - $_.FindLastSession().CreationTime).TotalMinutes}} \
| ConvertTo-Csv -NoTypeInformation\n",
    );
    if !config.server_address.is_empty() {
        script.push_str("Disconnect-VBRServer\n");
    }
    script
}
