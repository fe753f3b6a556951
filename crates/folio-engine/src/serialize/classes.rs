//! Presentation classes written onto serialized blocks.
//!
//! These are cosmetic only. The parser never reads them back.

pub const PARAGRAPH: &str = "mb-4 leading-relaxed";
pub const HEADING_1: &str = "mt-8 mb-4 text-3xl font-bold";
pub const HEADING_2: &str = "mt-6 mb-3 text-2xl font-semibold";
pub const HEADING_3: &str = "mt-4 mb-2 text-xl font-semibold";
pub const BULLET_LIST: &str = "mb-4 ml-6 list-disc";
pub const ORDERED_LIST: &str = "mb-4 ml-6 list-decimal";
pub const LIST_ITEM: &str = "mb-1";
pub const TASK_LIST: &str = "mb-4 list-none";
pub const TASK_ITEM: &str = "mb-1 flex items-start gap-2";
pub const BLOCKQUOTE: &str = "my-4 border-l-4 pl-4 italic";
pub const CODE_BLOCK: &str = "my-4 overflow-x-auto rounded p-4 font-mono text-sm";
pub const INLINE_CODE: &str = "rounded px-1 font-mono text-sm";
pub const IMAGE: &str = "my-6 h-auto max-w-full rounded";
pub const RULE: &str = "my-8";
pub const LINK: &str = "underline underline-offset-2";
pub const HIGHLIGHT: &str = "px-0.5";

pub fn heading(level: u8) -> &'static str {
    match level {
        1 => HEADING_1,
        2 => HEADING_2,
        _ => HEADING_3,
    }
}
