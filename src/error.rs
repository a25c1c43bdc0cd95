use thiserror::Error;

#[derive(Error, Debug)]
pub enum PapError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。設定ファイルの api_key か環境変数 OPENAI_API_KEY で指定してください")]
    MissingApiKey,

    #[error("移動先ディレクトリが設定されていません。設定ファイルの new_path か環境変数 NEW_PATH で指定してください")]
    MissingNewPath,

    #[error("プロトコルエラー: {0}")]
    Protocol(String),

    #[error("不正な要求: {0}")]
    InvalidRequest(String),

    #[error("テキスト抽出エラー: {0}")]
    Extraction(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("ファイル操作エラー: {0}")]
    Filesystem(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] pap_analysis_common::Error),
}

impl PapError {
    /// ホストとの接続が失われた（ループを止めるべき）エラーか
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            PapError::Protocol(_) | PapError::Common(pap_analysis_common::Error::Protocol(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, PapError>;
