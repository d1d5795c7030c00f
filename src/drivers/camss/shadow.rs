//! shadow 寄存器锁存计数
//!
//! 配置写入 shadow 寄存器后需要硬件在帧边界锁存. 计数 > 0 表示还有
//! 未被硬件确认的锁存, 此时不能换缓冲. 计数只会经 CAS 递减, 不会为负;
//! 快速切换模式时可能叠加多于一次的锁存, 所以不是 bool.

use core::sync::atomic::{AtomicI32, Ordering};

/// 原子 shadow 计数
#[derive(Debug, Default)]
pub struct ShadowCount {
    count: AtomicI32,
}

impl ShadowCount {
    pub const fn new() -> Self {
        ShadowCount { count: AtomicI32::new(0) }
    }

    /// 当前未确认的锁存数
    pub fn get(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    /// 没有未确认的锁存, 可以安全换缓冲
    pub fn is_idle(&self) -> bool {
        self.get() == 0
    }

    /// 发起一次锁存
    pub fn hold(&self) -> i32 {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// 硬件确认一次锁存; 返回递减后的值, 计数已为 0 时返回 -1 且不修改
    pub fn release(&self) -> i32 {
        dec_if_positive(&self.count)
    }

    /// 丢弃全部未确认的锁存, 返回丢弃的数量
    pub fn drain(&self) -> u32 {
        let mut drained = 0;
        while self.release() >= 0 {
            drained += 1;
        }
        drained
    }
}

/// 原子地 "大于 0 才减 1"
///
/// 返回旧值减 1; 旧值 <= 0 时不写入, 返回值 < 0.
pub(crate) fn dec_if_positive(v: &AtomicI32) -> i32 {
    let mut cur = v.load(Ordering::Acquire);
    loop {
        let dec = cur - 1;
        if dec < 0 {
            return dec;
        }
        match v.compare_exchange_weak(cur, dec, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return dec,
            Err(actual) => cur = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_never_negative() {
        let s = ShadowCount::new();
        assert_eq!(s.release(), -1);
        assert_eq!(s.get(), 0);

        assert_eq!(s.hold(), 1);
        assert_eq!(s.hold(), 2);
        assert!(!s.is_idle());
        assert_eq!(s.release(), 1);
        assert_eq!(s.release(), 0);
        assert_eq!(s.release(), -1);
        assert!(s.is_idle());
    }

    #[test]
    fn test_drain() {
        let s = ShadowCount::new();
        s.hold();
        s.hold();
        s.hold();
        assert_eq!(s.drain(), 3);
        assert_eq!(s.get(), 0);
        assert_eq!(s.drain(), 0);
    }

    #[test]
    fn test_dec_if_positive_concurrent() {
        use std::sync::Arc;
        use std::thread;

        let v = Arc::new(AtomicI32::new(1000));
        let handles: std::vec::Vec<_> = (0..4)
            .map(|_| {
                let v = Arc::clone(&v);
                thread::spawn(move || {
                    let mut hits = 0;
                    for _ in 0..400 {
                        if dec_if_positive(&v) >= 0 {
                            hits += 1;
                        }
                    }
                    hits
                })
            })
            .collect();
        let total: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 1000);
        assert_eq!(v.load(Ordering::SeqCst), 0);
    }
}
