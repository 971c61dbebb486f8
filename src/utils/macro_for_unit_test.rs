//! 单元测试辅助宏

use std::any::Any;

/// 从 `catch_unwind` 捕获的负载中取出panic消息
#[doc(hidden)]
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

/// 断言 `Result` 为错误，可选地匹配错误变体
///
/// - `assert_err!(expr)`：只要是 `Err`
/// - `assert_err!(expr, DataError::FrameNotFound(_))`：匹配变体
/// - `assert_err!(expr, DataError::IndexOutOfBounds { index, .. } if *index == 42)`：变体 + 条件
/// - `assert_err!(expr => "缺少视频帧")`：错误的 `Display` 文本包含给定片段
#[macro_export]
macro_rules! assert_err {
    ($expr:expr => $needle:expr) => {
        match &$expr {
            Err(e) => {
                let text = e.to_string();
                assert!(
                    text.contains($needle),
                    "错误消息 `{}` 不包含 `{}`",
                    text,
                    $needle
                );
            }
            Ok(v) => panic!("预期 Err，实际得到 Ok({:?})", v),
        }
    };
    ($expr:expr) => {
        if let Ok(v) = &$expr {
            panic!("预期 Err，实际得到 Ok({:?})", v);
        }
    };
    ($expr:expr, $($pattern:tt)+) => {
        match &$expr {
            Err(e) => assert!(
                matches!(e, $($pattern)+),
                "预期错误 `{}`，实际得到 `{:?}`",
                stringify!($($pattern)+),
                e
            ),
            Ok(v) => panic!(
                "预期错误 `{}`，实际得到 Ok({:?})",
                stringify!($($pattern)+),
                v
            ),
        }
    };
}

/// 断言表达式会panic，可选地比对完整的panic消息
#[macro_export]
macro_rules! assert_panic {
    ($expr:expr) => {
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)).is_ok() {
            panic!("表达式没有触发panic");
        }
    };
    ($expr:expr, $expected_msg:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $expr)) {
            Ok(_) => panic!("表达式没有触发panic"),
            Err(payload) => {
                let expected = $expected_msg.to_string();
                match $crate::utils::macro_for_unit_test::panic_message(&*payload) {
                    Some(msg) => assert_eq!(msg, expected, "panic消息与预期不符"),
                    None => panic!("panic负载不是字符串，预期消息为: {}", expected),
                }
            }
        }
    };
}
