//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions an oversized image is scaled down to.
///
/// Uses a single uniform factor `min(max_w / w, max_h / h)` so the aspect
/// ratio is preserved, and truncates toward zero. The constrained edge lands
/// exactly on its bound; neither edge drops below one pixel. Integer
/// arithmetic keeps `3001 * (2560 / 3001)` from rounding down to 2559.
///
/// # Returns
/// * `None` if the image already fits (both edges within the bounds)
/// * `Some((width, height))` otherwise
///
/// # Examples
/// ```
/// # use webp_press::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (2560, 2560)), Some((2560, 1920)));
/// assert_eq!(calculate_fit_dimensions((800, 600), (2560, 2560)), None);
/// ```
pub fn calculate_fit_dimensions(original: (u32, u32), max: (u32, u32)) -> Option<(u32, u32)> {
    let (orig_w, orig_h) = original;
    let (max_w, max_h) = max;

    if orig_w == 0 || orig_h == 0 || (orig_w <= max_w && orig_h <= max_h) {
        return None;
    }

    let (ow, oh, mw, mh) = (orig_w as u64, orig_h as u64, max_w as u64, max_h as u64);

    // max_w / orig_w <= max_h / orig_h, cross-multiplied
    let (w, h) = if mw * oh <= mh * ow {
        (mw, oh * mw / ow)
    } else {
        (ow * mh / oh, mh)
    };
    Some(((w as u32).max(1), (h as u32).max(1)))
}
