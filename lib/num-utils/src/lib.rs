#![no_std]

pub const fn align_down(val: usize, align: usize) -> usize {
    (val / align) * align
}

pub const fn align_up(val: usize, align: usize) -> usize {
    align_down(val + align - 1, align)
}

pub const fn is_aligned(val: usize, align: usize) -> bool {
    val % align == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_down_basic() {
        assert_eq!(align_down(0, 0x1000), 0);
        assert_eq!(align_down(0xfff, 0x1000), 0);
        assert_eq!(align_down(0x1000, 0x1000), 0x1000);
        assert_eq!(align_down(0x1001, 0x1000), 0x1000);
    }

    #[test]
    fn align_up_basic() {
        assert_eq!(align_up(0, 0x1000), 0);
        assert_eq!(align_up(1, 0x1000), 0x1000);
        assert_eq!(align_up(0x1000, 0x1000), 0x1000);
        assert_eq!(align_up(0x1001, 0x1000), 0x2000);
    }

    #[test]
    fn alignment_check() {
        assert!(is_aligned(0, 8));
        assert!(is_aligned(0x2000, 0x1000));
        assert!(!is_aligned(0x2001, 0x1000));
    }
}
