use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanaiError>;

#[derive(Error, Debug)]
pub enum CanaiError {
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("git {command} failed: {stderr}")]
    GitCommand { command: String, stderr: String },
    #[error("Clone of {url} failed: {reason}")]
    CloneFailed { url: String, reason: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upload rejected with status {status}")]
    UploadStatus { status: u16, body: String },
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Batch file error: {0}")]
    Batch(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

// gix errors are large, keep the enum small by boxing them
impl From<gix::open::Error> for CanaiError {
    fn from(err: gix::open::Error) -> Self {
        CanaiError::Git(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for CanaiError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        CanaiError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for CanaiError {
    fn from(err: gix::object::commit::Error) -> Self {
        CanaiError::Commit(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for CanaiError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        CanaiError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for CanaiError {
    fn from(err: gix::objs::decode::Error) -> Self {
        CanaiError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for CanaiError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        CanaiError::DiffTreeToTree(Box::new(err))
    }
}
