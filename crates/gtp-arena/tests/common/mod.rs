//! A scriptable stand-in for a GTP engine, written as a POSIX shell script.
//!
//! The stub records every command it receives in a log file, surrounds its
//! `genmove` answers with noise and a stale response, always passes, and reports
//! `B+8` as the final score.

use std::path::{Path, PathBuf};
use std::process::Command;

const STUB_ENGINE: &str = r#"
log="$1"
while read -r id cmd rest; do
  echo "$id $cmd $rest" >> "$log"
  case "$cmd" in
    genmove)
      echo "thinking about $rest"
      printf '= 999 stale\n\n'
      printf '= %s PASS\n\n' "$id"
      ;;
    final_score)
      printf '= %s B+8\n\n' "$id"
      ;;
    quit)
      printf '= %s\n\n' "$id"
      exit 0
      ;;
    *)
      printf '= %s\n\n' "$id"
      ;;
  esac
done
"#;

pub struct StubEngine {
    pub script: PathBuf,
    pub log: PathBuf,
}

impl StubEngine {
    /// Writes the stub script into `dir`; commands it receives go to `<name>.log`.
    pub fn install(dir: &Path, name: &str) -> Self {
        let script = dir.join(format!("{}.sh", name));
        std::fs::write(&script, STUB_ENGINE).unwrap();
        Self {
            script,
            log: dir.join(format!("{}.log", name)),
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new("sh");
        command.arg(&self.script).arg(&self.log);
        command
    }

    /// Every command line the stub has received so far.
    pub fn received(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect()
    }
}
