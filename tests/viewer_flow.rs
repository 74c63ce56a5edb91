// End-to-end flow over the test doubles: fetch a record, validate and
// extract, bind a board, drive playback.

use kifu_viewer::playback::{PLAYBACK_PERIOD, PlaybackController, Tick};
use kifu_viewer::registry::ViewerRegistry;
use kifu_viewer::test_util::{FakeFactory, FakeTransport};
use kifu_viewer::{kif, loader};
use pretty_assertions::assert_eq;

const FIVE_MOVES_NO_BOARD: &str = "\
先手：佐藤\n\
後手：鈴木\n\
\n\
1 ７六歩(77)\n\
2 ３四歩(33)\n\
3 ２六歩(27)\n\
4 ８四歩(83)\n\
5 ２五歩(26)\n";

#[async_std::test]
async fn record_loads_into_board_and_plays_through() {
    let factory = FakeFactory::with_mounts(["board-1"]);
    let transport = FakeTransport::new().with_response("/shogi/api/kifu/game.kif", FIVE_MOVES_NO_BOARD);
    let mut registry = ViewerRegistry::new(factory.clone(), transport);

    let text = registry.load_from_url("board-1", "/shogi/api/kifu/game.kif").await.map(|viewer| {
        viewer.loaded_texts().pop().unwrap()
    });
    let text = text.expect("record should load");

    // Validation: only the missing board diagram warns.
    let validation = kif::validate(&text);
    assert!(validation.is_valid);
    assert_eq!(validation.warnings, vec!["No board diagram found".to_owned()]);

    let info = kif::extract_info(&text);
    assert_eq!(info.move_count, 5);
    assert_eq!(info.sente, "佐藤");

    // Playback over the bound viewer; the fake derives 5 moves from the load.
    let viewer = registry.get("board-1").unwrap().clone();
    let mut controller: PlaybackController<_, u32> = PlaybackController::new(viewer);
    assert_eq!(controller.total_moves(), 5);
    assert_eq!(controller.play(), Some(PLAYBACK_PERIOD));
    controller.attach_timer(1);
    let mut advances = 0;
    loop {
        match controller.tick() {
            Tick::Advanced => advances += 1,
            Tick::Finished(handle) => {
                assert_eq!(handle, Some(1));
                break;
            }
        }
    }
    assert_eq!(advances, 5);
    assert!(!controller.is_playing());
}

#[async_std::test]
async fn transport_failure_leaves_the_registry_untouched() {
    let factory = FakeFactory::with_mounts(["board-1"]);
    let mut registry = ViewerRegistry::new(factory, FakeTransport::new());
    assert!(registry.load_from_url("board-1", "/shogi/api/kifu/missing.kif").await.is_none());
    assert!(registry.is_empty());
}

#[test]
fn normalized_record_round_trips_through_the_formatters() {
    let indented: String =
        FIVE_MOVES_NO_BOARD.split('\n').map(|line| format!("    {line}\n")).collect();
    let normalized = kif::normalize(&indented);
    assert_eq!(kif::normalize(&normalized), normalized);
    assert_eq!(kif::to_compact(&normalized), "７六歩(77) ３四歩(33) ２六歩(27) ８四歩(83) ２五歩(26)");
    assert!(kif::to_markup(&normalized).contains("<div class=\"kifu-move\">1 ７六歩(77)</div>"));
}

#[test]
fn transport_errors_format_for_the_log() {
    assert_eq!(loader::TransportError::Status(404).to_string(), "HTTP error, status: 404");
}
