use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to execute `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with status {status:?}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("`{command}` produced non-UTF-8 {stream} output")]
    NonUtf8Output {
        command: String,
        stream: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("{path} is not a git repository")]
    NotARepository { path: PathBuf },
    #[error("failed to parse git output: {0}")]
    Parse(String),
}
