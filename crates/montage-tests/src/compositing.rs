//! End-to-end compositing tests across the session and compositor.

use image::{Rgba, RgbaImage};
use montage_compositor::{CanvasSize, Compositor, TextRenderer};
use montage_media::ImageSource;
use montage_session::EditorSession;
use montage_timeline::AssetKind;

const CANVAS: CanvasSize = CanvasSize {
    width: 16,
    height: 16,
};

fn compositor() -> Compositor {
    Compositor::with_text(CANVAS, TextRenderer::disabled())
}

fn solid(color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(2, 2, Rgba(color))
}

/// Session with one solid-color image clip at [0, 5) scaled to cover the
/// canvas, placed on the given lane index.
fn add_covering_clip(
    session: &mut EditorSession,
    lane: usize,
    color: [u8; 4],
    start: f64,
    duration: f64,
) -> uuid::Uuid {
    let asset = session.add_asset(AssetKind::Image, "mem://solid", "Solid", None);
    session.insert_source(asset, Box::new(ImageSource::from_image(solid(color))));
    let track = session.tracks()[lane].id;
    let clip = session.add_clip(asset, track, start, duration).unwrap();
    let mut props = session.clip(clip).unwrap().properties.clone();
    props.scale = 8.0;
    session.set_clip_properties(clip, props);
    clip
}

#[test]
fn image_clip_contributes_inside_interval_only() {
    let mut session = EditorSession::new();
    add_covering_clip(&mut session, 0, [255, 0, 0, 255], 0.0, 5.0);
    session.select(None);

    session.scrub(2.5);
    let frame = session.render_preview(&compositor());
    assert_eq!(frame.get_pixel(8, 8).0, [255, 0, 0, 255]);

    // Exclusive end boundary: the clip contributes nothing at t = 5.0.
    session.scrub(5.0);
    let frame = session.render_preview(&compositor());
    assert_eq!(frame.get_pixel(8, 8).0, [0, 0, 0, 255]);
}

#[test]
fn storage_order_defines_layer_order() {
    let mut session = EditorSession::new();
    // Lane 2 is the bottom compositing layer, lane 0 the top.
    add_covering_clip(&mut session, 2, [0, 0, 255, 255], 0.0, 5.0);
    add_covering_clip(&mut session, 0, [255, 0, 0, 255], 0.0, 5.0);
    session.select(None);

    session.scrub(1.0);
    let frame = session.render_preview(&compositor());
    assert_eq!(frame.get_pixel(8, 8).0, [255, 0, 0, 255]);
}

#[test]
fn hiding_the_top_track_reveals_the_layer_below() {
    use montage_media::{source::BoundPool, MediaPool};
    use montage_timeline::{AssetRegistry, Clip, ClipProperties, Track};

    let mut registry = AssetRegistry::new();
    let mut pool = MediaPool::new();
    let red = registry.add(AssetKind::Image, "mem://red", "Red", None);
    pool.insert(red, Box::new(ImageSource::from_image(solid([255, 0, 0, 255]))));
    let blue = registry.add(AssetKind::Image, "mem://blue", "Blue", None);
    pool.insert(blue, Box::new(ImageSource::from_image(solid([0, 0, 255, 255]))));

    let mut top = Track::new("V2");
    top.visible = false;
    let bottom = Track::new("V1");

    let covering = |asset, track_id| {
        let mut clip = Clip::new(asset, track_id, 0.0, 5.0);
        clip.properties = ClipProperties {
            scale: 8.0,
            ..ClipProperties::default()
        };
        clip
    };
    let clips = vec![covering(red, top.id), covering(blue, bottom.id)];
    let tracks = vec![top, bottom];

    let frame = compositor().render(
        &tracks,
        &clips,
        &registry,
        &mut BoundPool {
            pool: &mut pool,
            registry: &registry,
        },
        1.0,
        None,
    );
    // The hidden top lane is skipped; the lane below shows through.
    assert_eq!(frame.get_pixel(8, 8).0, [0, 0, 255, 255]);
}

#[test]
fn selection_outline_appears_in_preview_only() {
    let mut session = EditorSession::new();
    let clip = add_covering_clip(&mut session, 0, [255, 0, 0, 255], 0.0, 5.0);
    session.scrub(2.5);

    session.select(Some(clip));
    let with_selection = session.render_preview(&compositor());
    session.select(None);
    let without_selection = session.render_preview(&compositor());
    assert_ne!(with_selection, without_selection);

    // The export path suppresses the outline even with a live selection.
    session.select(Some(clip));
    let mut sink = montage_media::FrameCollector::new();
    session
        .export(
            &compositor(),
            &mut sink,
            &montage_session::SeekWait::immediate(),
            &montage_session::ExportCancel::new(),
            |_| {},
        )
        .unwrap();
    let exported_frame = &sink.frames[75]; // t = 2.5 at 30 fps
    assert_eq!(exported_frame, &without_selection);
}

#[test]
fn dangling_asset_degrades_to_nothing() {
    let mut session = EditorSession::new();
    let asset = session.add_asset(AssetKind::Image, "mem://ghost", "Ghost", None);
    let track = session.tracks()[0].id;
    session.add_clip(asset, track, 0.0, 5.0).unwrap();
    session.select(None);
    // No source inserted and no readable file behind the locator: the clip
    // must degrade to painting nothing, not error.
    session.scrub(1.0);
    let frame = session.render_preview(&compositor());
    assert!(frame.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn transform_properties_move_the_content() {
    let mut session = EditorSession::new();
    let clip = add_covering_clip(&mut session, 0, [0, 255, 0, 255], 0.0, 5.0);
    session.select(None);
    session.scrub(1.0);

    let centered = session.render_preview(&compositor());

    let mut props = session.clip(clip).unwrap().properties.clone();
    props.position_x = 0.0; // content center on the left edge
    session.set_clip_properties(clip, props);
    let shifted = session.render_preview(&compositor());

    assert_ne!(centered, shifted);
    // Content now hangs off the left edge: the right side is background.
    assert_eq!(shifted.get_pixel(14, 8).0, [0, 0, 0, 255]);
    assert_eq!(shifted.get_pixel(1, 8).0, [0, 255, 0, 255]);
}
