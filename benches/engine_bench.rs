use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

use landlord::board::Board;
use landlord::dice::SeededRandomness;
use landlord::game::Game;
use landlord::rules::Rules;
use landlord::selfplay::{play_bot_turn, play_game, SelfPlayConfig};

const PLAYERS: [&str; 4] = ["ana", "ben", "cat", "dan"];

fn started_game(seed: u64) -> Game {
    let mut game = Game::new(Rules::default()).with_randomness(SeededRandomness::from_seed(seed));
    game.start(&PLAYERS).unwrap();
    game
}

fn bench_roll_turn(c: &mut Criterion) {
    c.bench_function("roll_turn", |b| {
        let mut game = started_game(1);
        b.iter(|| {
            if game.is_ended() {
                game.start(&PLAYERS).unwrap();
            }
            black_box(game.roll_turn().unwrap())
        })
    });
}

fn bench_bot_turn(c: &mut Criterion) {
    c.bench_function("bot_turn_4_players", |b| {
        let mut game = started_game(2);
        let mut turn = 0;
        b.iter(|| {
            if game.is_ended() {
                game.start(&PLAYERS).unwrap();
            }
            turn += 1;
            black_box(play_bot_turn(&mut game, 200, turn).unwrap())
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut game = started_game(3);
    for _ in 0..40 {
        play_bot_turn(&mut game, 200, 0).unwrap();
    }
    c.bench_function("snapshot_and_listing", |b| {
        b.iter(|| (black_box(game.snapshot()), black_box(game.property_listing())))
    });
}

fn bench_board_build(c: &mut Criterion) {
    c.bench_function("standard_board", |b| b.iter(|| black_box(Board::standard())));
}

fn bench_full_game(c: &mut Criterion) {
    let config = SelfPlayConfig {
        players: 4,
        max_turns: 1000,
        quiet: true,
        ..SelfPlayConfig::default()
    };
    let mut group = c.benchmark_group("selfplay");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);
    group.bench_function("full_game_4_players", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            black_box(play_game(&config, 0, seed).unwrap())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_roll_turn,
    bench_bot_turn,
    bench_snapshot,
    bench_board_build,
    bench_full_game,
);
criterion_main!(benches);
