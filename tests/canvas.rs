use asciiscribe::document::{self, CompressionMode, PersistOptions};
use asciiscribe::draw::{CanvasEvent, DirtyTracker};
use asciiscribe::util::{Point, Rect};
use asciiscribe::{Canvas, Connectivity, DrawEngine, EditHistory, Layer};
use std::sync::{Arc, Mutex};

fn filled_layer(name: &str, offset: Point, size: usize, ch: char) -> Layer {
    let mut layer = Layer::new(name, offset, size, size);
    layer.fill(Some(ch));
    layer
}

#[test]
fn flood_fill_replaces_uniform_ten_by_ten() {
    let mut canvas = Canvas::new(10, 10).unwrap();
    canvas
        .push_layer(filled_layer("a", Point::ORIGIN, 10, 'A'))
        .unwrap();

    let changed =
        DrawEngine::new(&mut canvas, 0).flood_fill(Point::new(5, 5), Some('B'), Connectivity::FourWay);

    assert_eq!(changed, 100);
    assert!(canvas.art_string().chars().filter(|c| *c != '\n').all(|c| c == 'B'));
}

#[test]
fn topmost_visible_layer_wins() {
    let mut canvas = Canvas::new(10, 10).unwrap();
    canvas.push_layer(filled_layer("x", Point::ORIGIN, 5, 'X')).unwrap();
    canvas
        .push_layer(filled_layer("y", Point::new(2, 2), 5, 'Y'))
        .unwrap();

    assert_eq!(canvas.get_character(2, 2), Some('X'));
    canvas.set_layer_visible(0, false).unwrap();
    assert_eq!(canvas.get_character(2, 2), Some('Y'));
    assert_eq!(canvas.get_character(0, 0), None);
}

#[test]
fn crop_preserves_relative_content() {
    let mut canvas = Canvas::new(12, 8).unwrap();
    canvas
        .push_layer(Layer::from_rows(
            "art",
            Point::new(1, 1),
            &["abcde", "fghij", "klmno"],
            ' ',
        ))
        .unwrap();
    let rect = Rect::new(2, 1, 4, 3).unwrap();
    let before: Vec<_> = (rect.y..rect.bottom())
        .flat_map(|y| (rect.x..rect.right()).map(move |x| (x, y)))
        .map(|(x, y)| ((x, y), canvas.get_character(x, y)))
        .collect();

    canvas.crop(rect).unwrap();

    assert_eq!((canvas.width(), canvas.height()), (4, 3));
    for ((x, y), ch) in before {
        assert_eq!(canvas.get_character(x - rect.x, y - rect.y), ch);
    }
}

#[test]
fn editing_session_survives_undo_and_disk() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("scene.json");
    let options = PersistOptions {
        compression: CompressionMode::Auto,
        auto_compress_threshold_bytes: 64,
        ..PersistOptions::default()
    };

    let mut canvas = Canvas::new(20, 10).unwrap();
    canvas
        .push_layer(Layer::new("ground", Point::ORIGIN, 20, 10))
        .unwrap();
    let mut history = EditHistory::new(&canvas);

    DrawEngine::new(&mut canvas, 0).line(Point::new(0, 9), Point::new(19, 9), 0, Some('='));
    history.commit(&canvas);
    DrawEngine::new(&mut canvas, 0).circle(Point::new(10, 4), 3, Some('o'));
    history.commit(&canvas);
    let with_circle = canvas.art_string();

    assert!(history.rollback(&mut canvas));
    let ground_only = canvas.art_string();
    assert_ne!(ground_only, with_circle);
    assert!(history.rollforward(&mut canvas));
    assert_eq!(canvas.art_string(), with_circle);

    document::save_canvas(&canvas, &path, &options).unwrap();
    let mut loaded = document::load_canvas(&path, &options).unwrap();
    assert_eq!(loaded.art_string(), with_circle);

    let mut reloaded_history = EditHistory::new(&loaded);
    DrawEngine::new(&mut loaded, 0).text(Point::new(1, 1), "hi");
    reloaded_history.commit(&loaded);
    reloaded_history.rollback(&mut loaded);
    assert_eq!(loaded.art_string(), with_circle);
}

#[test]
fn dirty_tracker_follows_canvas_events() {
    let mut canvas = Canvas::new(8, 4).unwrap();
    canvas.push_layer(Layer::new("l", Point::ORIGIN, 8, 4)).unwrap();

    let tracker = Arc::new(Mutex::new(DirtyTracker::new()));
    let sink = Arc::clone(&tracker);
    canvas.subscribe(move |event: &CanvasEvent| {
        sink.lock().unwrap().observe(event);
    });

    DrawEngine::new(&mut canvas, 0).point(Point::new(3, 2), Some('*'));

    let regions = tracker.lock().unwrap().take_regions(8, 4);
    assert!(regions.iter().any(|r| r.contains(Point::new(3, 2))));
    assert!(tracker.lock().unwrap().is_clean());
}
