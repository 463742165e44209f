use timeboard_core::{
    Axis, Board, BoardConfig, ColSpan, DeckFile, DragPhase, DragSession, Intent, LanePolicy,
    TARGET_COLS,
};

fn board(lane_count: usize, policy: LanePolicy) -> Board {
    // Axis 0..=2000 over 40 columns of 50 years each.
    Board::new(
        BoardConfig {
            axis: Axis { min: 0, max: 2000 },
            lane_count,
            lane_policy: policy,
            target_cols: TARGET_COLS,
        },
        0,
        2000,
    )
    .unwrap()
}

fn lane_is_disjoint(b: &Board, lane: usize) -> bool {
    let occ = b.lanes().occupied(lane, None);
    occ.windows(2).all(|pair| !pair[0].overlaps(&pair[1]))
}

#[test]
fn drag_walks_a_block_across_a_populated_lane() {
    let mut b = board(2, LanePolicy::ServerStable);
    b.commit("wall", 0, 20, 4);
    b.commit("mover", 0, 10, 3);

    let grid = *b.grid();
    let mut session = DragSession::begin("mover", 1, 3, 0, 0, 10);

    // Pointer sweeps right in years; each accepted solve is committed,
    // rejections hold the last accepted start.
    let mut last_start = 10;
    for pointer_year in [750, 850, 950, 1050, 1250] {
        let desired = session.desired_start_col(&grid, pointer_year);
        if let Some(start) = b.solve_move(&session.card_id, 0, session.span_cols, desired) {
            b.commit(&session.card_id, 0, start, session.span_cols);
            last_start = start;
        }
        assert!(lane_is_disjoint(&b, 0), "overlap after year {pointer_year}");
    }

    // 750 -> col 15, 850 -> 17 flush against the wall, 950 and 1050 put
    // the span onto the wall and are rejected, 1250 -> col 25 past it.
    assert_eq!(last_start, 25);
    let placed = b.lanes().get("mover").unwrap();
    assert_eq!(placed.span, ColSpan::new(25, 28));

    session.resolve();
    assert_eq!(session.phase, DragPhase::Resolved);
}

#[test]
fn rejected_move_holds_the_block_in_place() {
    let mut b = board(1, LanePolicy::ServerStable);
    b.commit("wall", 0, 20, 4);
    b.commit("mover", 0, 15, 3);

    // Pointer dives straight into the wall: no commit, nothing moves.
    assert_eq!(b.solve_move("mover", 0, 3, 19), None);
    assert_eq!(b.lanes().get("mover").unwrap().span, ColSpan::new(15, 18));
}

#[test]
fn lane_change_commits_atomically_with_the_columns() {
    let mut b = board(2, LanePolicy::ServerStable);
    b.commit("blocker", 1, 10, 4);
    b.commit("mover", 0, 10, 3);

    // Crossing into lane 1 at an occupied spot is rejected outright; the
    // mover keeps both its lane and its columns.
    assert_eq!(b.solve_move("mover", 1, 3, 11), None);
    let placed = b.lanes().get("mover").unwrap();
    assert_eq!((placed.lane, placed.span), (0, ColSpan::new(10, 13)));

    // A clear spot on lane 1 moves lane and columns in one commit.
    let start = b.solve_move("mover", 1, 3, 16).unwrap();
    b.commit("mover", 1, start, 3);
    let placed = b.lanes().get("mover").unwrap();
    assert_eq!((placed.lane, placed.span), (1, ColSpan::new(16, 19)));
    assert!(b.lanes().occupied(0, None).is_empty());
}

#[test]
fn drop_flow_lands_on_the_nearest_free_columns() {
    let mut b = board(1, LanePolicy::ServerStable);
    b.commit("a", 0, 5, 3);
    b.commit("b", 0, 8, 4);

    let start = b.solve_drop("new", 0, 2, 9).unwrap();
    assert_eq!(start, 12);
    b.commit("new", 0, start, 2);
    assert!(lane_is_disjoint(&b, 0));

    // The reported drop year is the center of the accepted span, so the
    // host re-centering it lands on the same columns.
    let drop_year = b.grid().col_to_year(start + 2 / 2);
    assert_eq!(drop_year, 650);
    let intent = Intent::PlaceFromPool {
        id: "new".to_string(),
        drop_year,
        lane: 0,
    };
    let json = serde_json::to_value(&intent).unwrap();
    assert_eq!(json["type"], "place_from_pool");
    assert_eq!(json["drop_year"], 650);
}

#[test]
fn drop_on_a_full_lane_leaves_the_pool_card_alone() {
    let mut b = board(1, LanePolicy::ServerStable);
    b.commit("big", 0, 0, 40);

    assert_eq!(b.solve_drop("new", 0, 2, 17), None);
    assert!(b.lanes().get("new").is_none());
    assert_eq!(b.lanes().len(), 1);
}

#[test]
fn remove_then_drop_reuses_the_freed_columns() {
    let mut b = board(1, LanePolicy::ServerStable);
    b.commit("a", 0, 10, 4);
    b.commit("b", 0, 14, 4);

    // Dropping onto the seam of the two blocks walks the span out to the
    // first free start on the left.
    assert_eq!(b.solve_drop("new", 0, 4, 12), Some(6));

    // With the first block gone the drop lands where it was aimed.
    assert!(b.remove("a"));
    let start = b.solve_drop("new", 0, 4, 12).unwrap();
    assert_eq!(start, 10);
    b.commit("new", 0, start, 4);
    assert!(lane_is_disjoint(&b, 0));
}

#[test]
fn greedy_repack_flows_overlapping_commits_to_open_lanes() {
    let mut b = board(2, LanePolicy::GreedyRepack);
    assert!(b.commit("a", 0, 10, 6).is_empty());
    assert!(b.commit("b", 0, 12, 6).is_empty());

    let a = b.lanes().get("a").unwrap();
    let bb = b.lanes().get("b").unwrap();
    assert_ne!(a.lane, bb.lane);
    assert!(lane_is_disjoint(&b, 0) && lane_is_disjoint(&b, 1));

    // A third card overlapping both forces an eviction. First-fit runs in
    // start order, so the latest-starting overlapper is the one pushed
    // out, not the most recent commit.
    let evicted = b.commit("c", 0, 11, 6);
    assert_eq!(evicted, vec!["b".to_string()]);
    assert!(b.lanes().get("b").is_none());
    assert!(b.lanes().get("c").is_some());
}

#[test]
fn pointer_cancel_reverts_but_keeps_the_last_commit() {
    let mut b = board(1, LanePolicy::ServerStable);
    b.commit("mover", 0, 10, 3);
    let mut session = DragSession::begin("mover", 9, 3, 0, 0, 10);

    let start = b.solve_move("mover", 0, 3, 14).unwrap();
    b.commit("mover", 0, start, 3);

    session.revert();
    assert_eq!(session.phase, DragPhase::Reverted);
    assert!(!session.is_active());
    // The registry keeps the last accepted position; there is no rollback
    // to the gesture origin.
    assert_eq!(b.lanes().get("mover").unwrap().span, ColSpan::new(14, 17));
}

#[test]
fn intents_serialize_with_snake_case_tags() {
    let intent = Intent::SetGuess {
        id: "evt-1".to_string(),
        guess_start: -150,
        guess_end: -100,
        lane: 2,
    };
    let json = serde_json::to_value(&intent).unwrap();
    assert_eq!(json["type"], "set_guess");
    assert_eq!(json["id"], "evt-1");
    assert_eq!(json["guess_start"], -150);
    assert_eq!(json["guess_end"], -100);
    assert_eq!(json["lane"], 2);

    let decoded: Intent = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, intent);

    let json = serde_json::to_value(Intent::RemoveCard {
        id: "evt-9".to_string(),
    })
    .unwrap();
    assert_eq!(json["type"], "remove_card");
}

#[test]
fn drag_sessions_round_trip_through_json() {
    let session = DragSession::begin("evt-4", 11, 5, -30, 1, 8);
    let json = serde_json::to_value(&session).unwrap();
    assert_eq!(json["card_id"], "evt-4");
    assert_eq!(json["phase"], "dragging");
    assert_eq!(json["grab_offset_years"], -30);

    let decoded: DragSession = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, session);
}

#[test]
fn deck_files_fill_in_defaults() {
    let json = serde_json::json!({
        "axis_min": -500,
        "axis_max": 2000,
        "cards": [
            { "id": "evt-1", "title": "Moon landing", "start": 1969, "end": 1969 },
            { "id": "evt-2", "start": -221, "end": -206, "guess_start": 0, "guess_end": 15, "lane": 1 }
        ]
    });
    let deck: DeckFile = serde_json::from_value(json).unwrap();
    assert_eq!(deck.lane_count, 1);
    assert!(deck.ticks.is_empty());
    assert!(deck.placed.is_empty());
    assert_eq!(deck.cards[0].guess_end, 1);
    assert_eq!(deck.cards[1].lane, 1);
}

#[test]
fn degenerate_spans_widen_on_deserialize() {
    let span: ColSpan = serde_json::from_value(serde_json::json!({ "start": 4, "end": 4 })).unwrap();
    assert_eq!(span.width(), 1);
    assert_eq!(span.end(), 5);
}

#[test]
fn boards_round_trip_through_json_with_their_placements() {
    let mut b = board(2, LanePolicy::ServerStable);
    b.commit("a", 0, 10, 4);
    b.commit("b", 1, 3, 2);

    let json = serde_json::to_string(&b).unwrap();
    let decoded: Board = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded.axis(), b.axis());
    assert_eq!(decoded.grid(), b.grid());
    assert_eq!(decoded.lanes().occupied(0, None), b.lanes().occupied(0, None));
    assert_eq!(decoded.lanes().occupied(1, None), b.lanes().occupied(1, None));
}
