//! Failure Report - Internal detail carried alongside a scrubbed response
//!
//! A server-side failure is rendered with a fixed generic body, and the
//! distinguishing detail travels out-of-band as a [`FailureReport`] so the
//! boundary can log it without ever serializing it.

/// 5xx レスポンスに必ず使用する固定メッセージ
pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error";

/// 障害の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 既知のインフラ障害（永続化層の接続不可・SQL 拒否など）
    Infrastructure,
    /// 分類不能な障害（panic、想定外のエラー型）
    Unclassified,
}

/// ログ専用の障害詳細
///
/// レスポンスの extensions に格納され、境界で取り出されてログに記録されます。
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub class: FailureClass,
    pub detail: String,
}

impl FailureReport {
    pub fn infrastructure(detail: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Infrastructure,
            detail: detail.into(),
        }
    }

    pub fn unclassified(detail: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Unclassified,
            detail: detail.into(),
        }
    }
}
