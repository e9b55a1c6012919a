use thiserror::Error;

/// Outcomes of a lookup that are reported back to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Không thể tải dữ liệu: {0}")]
    DatasetLoad(String),
    #[error("Không thể tải dữ liệu: tệp dữ liệu không có bản ghi hợp lệ")]
    EmptyDataset,
    #[error("Vui lòng nhập SBD.")]
    EmptyQuery,
    #[error("Không tìm thấy SBD {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl LookupError {
    pub fn severity(&self) -> Severity {
        match self {
            LookupError::DatasetLoad(_) | LookupError::EmptyDataset => Severity::Error,
            LookupError::EmptyQuery => Severity::Warning,
            LookupError::NotFound(_) => Severity::Info,
        }
    }
}
