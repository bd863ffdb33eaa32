//! Auth Commands

/// Telegram WebApp 登录命令
#[derive(Debug, Clone)]
pub struct TelegramLogin {
    /// Telegram 下发的完整 initData 查询串
    pub init_data: String,
}
