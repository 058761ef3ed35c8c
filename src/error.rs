use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelmetGuardError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カメラへのアクセスが許可されていません。`helmet-guard config --reset-access` で再確認できます")]
    PermissionDenied,

    #[error("撮影エラー: {0}")]
    CaptureFailure(String),

    #[error("解析エラー: {0}")]
    AnalysisFailure(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl From<helmet_guard_common::Error> for HelmetGuardError {
    fn from(e: helmet_guard_common::Error) -> Self {
        match e {
            helmet_guard_common::Error::Io(e) => HelmetGuardError::Io(e),
            helmet_guard_common::Error::Json(e) => HelmetGuardError::JsonParse(e),
            helmet_guard_common::Error::Export(msg) => HelmetGuardError::ExcelGeneration(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, HelmetGuardError>;
