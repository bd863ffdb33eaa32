//! 认证适配器

mod jwt;
mod telegram;

pub use jwt::JwtTokenService;
pub use telegram::TelegramInitDataVerifier;
