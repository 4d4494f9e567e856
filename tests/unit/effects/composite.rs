use super::*;

const RED: PremulRgba8 = [255, 0, 0, 255];
const BLUE: PremulRgba8 = [0, 0, 255, 255];

fn solid(px: PremulRgba8, n: usize) -> Vec<u8> {
    px.iter().copied().cycle().take(n * 4).collect()
}

fn pixel(buf: &[u8], w: u32, x: u32, y: u32) -> PremulRgba8 {
    let i = ((y * w + x) * 4) as usize;
    [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
}

#[test]
fn over_onto_transparent_is_identity() {
    assert_eq!(over([0, 0, 0, 0], [10, 20, 30, 40], 1.0), [10, 20, 30, 40]);
    assert_eq!(over(RED, [0, 0, 0, 0], 1.0), RED);
    assert_eq!(over(RED, BLUE, 0.0), RED);
    assert_eq!(over(RED, BLUE, 1.0), BLUE);
}

#[test]
fn crossfade_endpoints() {
    assert_eq!(crossfade(RED, BLUE, 0.0), RED);
    assert_eq!(crossfade(RED, BLUE, 1.0), BLUE);
    let mid = crossfade(RED, BLUE, 0.5);
    assert_eq!(mid[3], 255);
    assert!(mid[0] > 100 && mid[2] > 100);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = vec![0u8; 8];
    assert!(crossfade_into(&mut dst, &[0u8; 8], &[0u8; 4], 0.5).is_err());
    let err = shifted_over_in_place(&mut dst, &[0u8; 8], 4, 4, 0, 0).unwrap_err();
    assert!(err.to_string().starts_with("content error:"));
}

#[test]
fn hard_wipe_splits_frame_at_edge() {
    let (w, h) = (4u32, 1u32);
    let a = solid(RED, 4);
    let b = solid(BLUE, 4);
    let mut dst = vec![0u8; 16];
    let params = WipeParams {
        width: w,
        height: h,
        t: 0.5,
        dir: WipeDir::LeftToRight,
        soft_edge: 0.0,
    };
    wipe_into(&mut dst, &a, &b, params).unwrap();
    assert_eq!(pixel(&dst, w, 0, 0), BLUE);
    assert_eq!(pixel(&dst, w, 1, 0), BLUE);
    assert_eq!(pixel(&dst, w, 2, 0), RED);
    assert_eq!(pixel(&dst, w, 3, 0), RED);

    wipe_into(
        &mut dst,
        &a,
        &b,
        WipeParams {
            dir: WipeDir::RightToLeft,
            ..params
        },
    )
    .unwrap();
    assert_eq!(pixel(&dst, w, 0, 0), RED);
    assert_eq!(pixel(&dst, w, 3, 0), BLUE);
}

#[test]
fn luma_wipe_endpoints_show_single_frame() {
    let (w, h) = (8u32, 8u32);
    let a = solid(RED, 64);
    let b = solid(BLUE, 64);
    let mut dst = vec![0u8; 256];
    for pattern in [
        LumaPattern::Horizontal,
        LumaPattern::Vertical,
        LumaPattern::Radial,
        LumaPattern::Diamond,
    ] {
        for softness in [0.0, 0.2] {
            let params = LumaParams {
                width: w,
                height: h,
                t: 0.0,
                pattern,
                softness,
                invert: false,
            };
            luma_wipe_into(&mut dst, &a, &b, params).unwrap();
            assert_eq!(dst, a, "{pattern:?} t=0");
            luma_wipe_into(&mut dst, &a, &b, LumaParams { t: 1.0, ..params }).unwrap();
            assert_eq!(dst, b, "{pattern:?} t=1");
        }
    }
}

#[test]
fn luma_invert_reveals_opposite_side_first() {
    let (w, h) = (4u32, 1u32);
    let a = solid(RED, 4);
    let b = solid(BLUE, 4);
    let mut dst = vec![0u8; 16];
    let params = LumaParams {
        width: w,
        height: h,
        t: 0.3,
        pattern: LumaPattern::Horizontal,
        softness: 0.0,
        invert: false,
    };
    luma_wipe_into(&mut dst, &a, &b, params).unwrap();
    assert_eq!(pixel(&dst, w, 0, 0), BLUE);
    assert_eq!(pixel(&dst, w, 3, 0), RED);

    luma_wipe_into(&mut dst, &a, &b, LumaParams { invert: true, ..params }).unwrap();
    assert_eq!(pixel(&dst, w, 0, 0), RED);
    assert_eq!(pixel(&dst, w, 3, 0), BLUE);
}

#[test]
fn shifted_over_moves_content_and_clips() {
    let (w, h) = (3u32, 1u32);
    let src = [RED, BLUE, [0, 255, 0, 255]].concat();
    let mut dst = vec![0u8; 12];
    shifted_over_in_place(&mut dst, &src, w, h, 1, 0).unwrap();
    assert_eq!(pixel(&dst, w, 0, 0), [0, 0, 0, 0]);
    assert_eq!(pixel(&dst, w, 1, 0), RED);
    assert_eq!(pixel(&dst, w, 2, 0), BLUE);
}
