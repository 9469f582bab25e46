//! 書き込み前の確認

use crate::error::{ContactTidyError, Result};
use dialoguer::Confirm;

/// 更新件数を示して続行するか尋ねる
pub fn confirm_apply(count: usize) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("{}件のレコードを更新します。続行しますか?", count))
        .default(false)
        .interact()
        .map_err(|e| ContactTidyError::CliExecution(format!("確認の入力に失敗: {}", e)))
}
