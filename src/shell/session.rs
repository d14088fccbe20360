use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{HudError, Result};

/// Marker the session prints after every command so replies can be delimited on
/// the shared output stream.
const END_OF_COMMAND: &str = "__FRAMEHUD_EOC__";

/// Live connection to the elevated helper process.
///
/// The helper executes each submitted line with `sh -c` semantics and writes the
/// command's stdout back over the pipe, terminated by the end-of-command marker.
pub struct HelperSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl HelperSession {
    /// Spawn the helper program and wire up its stdio pipes.
    pub async fn spawn(program: &str) -> Result<Self> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HudError::channel("helper stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HudError::channel("helper stdout not captured"))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Execute one command and read its output up to the end-of-command marker.
    ///
    /// Must not be called concurrently; the channel serializes callers through its
    /// command mutex so replies never interleave on the stream.
    pub async fn execute(&mut self, cmd: &str) -> Result<String> {
        let script = format!("{cmd}\nprintf '%s\\n' '{END_OF_COMMAND}'\n");
        self.stdin.write_all(script.as_bytes()).await?;
        self.stdin.flush().await?;

        let mut output = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            let read = self.stdout.read_line(&mut line).await?;
            if read == 0 {
                return Err(HudError::channel("helper closed its output stream"));
            }
            if line.trim_end() == END_OF_COMMAND {
                break;
            }
            output.push_str(&line);
        }
        Ok(output.trim().to_string())
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}
