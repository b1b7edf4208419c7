//! LCM Pop entry point
//!
//! Native builds run a headless session driven by the autopilot and store the
//! result in a local leaderboard file. The browser build is driven from the
//! page through `lcm_pop::web`.
//!
//! Usage: `lcm-pop [seed] [scores.json] [player name]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lcm_pop::sim::{Autopilot, GameDirector, Notification, PlayArea};
    use lcm_pop::FileScoreStore;

    /// 60 Hz frames
    const FRAME_MS: u64 = 16;
    /// Stop even if the run somehow never ends
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed_1c3d_u64);
    let scores_path = args.next().unwrap_or_else(|| "data/scores.json".to_string());
    let name = args.next().unwrap_or_default();

    log::info!("LCM Pop (native) starting with seed {seed}");

    let mut director = GameDirector::new(seed, PlayArea::default());
    let mut pilot = Autopilot::new(seed ^ 0x9e37_79b9, 0.85);
    director.start_game();
    director.show_how_to();

    let mut frames = 0;
    while director.state().is_running() && frames < MAX_FRAMES {
        director.tick(FRAME_MS);
        if let Some(id) = pilot.choose(director.state()) {
            director.select_object(id);
        }
        for note in director.drain_notifications() {
            report(&note);
        }
        frames += 1;
    }

    let hud = director.hud();
    println!(
        "Final: score {} at level {} with {} lives and {}s left",
        hud.score, hud.level, hud.lives, hud.time_left
    );

    let mut store = FileScoreStore::new(scores_path);
    director.submit_score(&mut store, &name);
    for note in director.drain_notifications() {
        report(&note);
    }

    fn report(note: &Notification) {
        match note {
            Notification::Welcome => println!("Welcome! Pop balloons that show common multiples."),
            Notification::HowTo {
                a,
                b,
                lcm,
                multiples_a,
                multiples_b,
            } => println!(
                "Multiples of {a}: {multiples_a:?}... multiples of {b}: {multiples_b:?}... LCM = {lcm}"
            ),
            Notification::Tip { message } => println!("Tip: {message}"),
            Notification::LevelUp {
                level,
                a,
                b,
                lcm,
                bonus,
            } => println!("Level {level} complete! LCM of {a} and {b} is {lcm}. +{bonus} bonus"),
            Notification::GameOver { score } => println!("Game over. Your score: {score}"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is lcm_pop::web::wasm_start, this is just to satisfy the compiler
}
