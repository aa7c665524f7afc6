use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use one_poker::bot::{BotSeat, success_calc};
use one_poker::entities::Deck;
use one_poker::seat::SeatDriver;
use one_poker::{GameConfig, OnePokerState};

/// Benchmark the win-probability estimate with a fresh depletion map
fn bench_success_calc(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let deck = Deck::new(3, 2, &mut rng);
    let estimate = deck.expected_left().clone();

    c.bench_function("success_calc_all_values", |b| {
        b.iter(|| {
            for reference in 2u8..=14u8 {
                std::hint::black_box(success_calc(&estimate, reference));
            }
        });
    });
}

/// Benchmark deck construction (shuffle plus cut)
fn bench_deck_construction(c: &mut Criterion) {
    c.bench_function("deck_new_three_subdecks", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| std::hint::black_box(Deck::new(3, 2, &mut rng)));
    });
}

/// Benchmark a complete two-bot game from deal to terminal state
fn bench_full_bot_game(c: &mut Criterion) {
    c.bench_function("bot_game_two_players", |b| {
        b.iter(|| {
            let seats: Vec<(String, Box<dyn SeatDriver>)> = vec![
                ("P1".to_string(), Box::new(BotSeat::with_seed(0, 1))),
                ("P2".to_string(), Box::new(BotSeat::with_seed(1, 2))),
            ];
            let game = OnePokerState::with_seed(GameConfig::default(), seats, 3);
            std::hint::black_box(game.run().unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_success_calc,
    bench_deck_construction,
    bench_full_bot_game
);
criterion_main!(benches);
