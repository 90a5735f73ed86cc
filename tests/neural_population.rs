use rand::SeedableRng;
use rand::rngs::SmallRng;
use snake_sim::brain::{self, GENOME_LEN, INPUT_SIZE};
use snake_sim::episode::{self, evaluate_population};
use snake_sim::{Dir, Game, GameConfig, Genome, NeuralPolicy, Policy, Pos};

#[test]
fn features_follow_the_vision_rays() {
    let g = Game::from_parts(GameConfig::default(), [Pos::new(0, 0)], Dir::Right, Pos::new(5, 0))
        .unwrap();
    let inputs = brain::encode(&g.observation(), 25);
    assert_eq!(inputs.len(), INPUT_SIZE);
    // Up: zero distance at the wall, flagged as danger.
    assert_eq!(&inputs[0..3], &[0.0, 0.0, 1.0]);
    // Right: food five cells away.
    assert_eq!(&inputs[6..9], &[0.2, 1.0, 0.0]);
    // Down runs the full column.
    assert_eq!(&inputs[12..15], &[24.0 / 25.0, 0.0, 0.0]);
}

#[test]
fn nearby_food_is_not_danger() {
    let g = Game::from_parts(GameConfig::default(), [Pos::new(5, 5)], Dir::Right, Pos::new(7, 5))
        .unwrap();
    let inputs = brain::encode(&g.observation(), 25);
    // Right: food two cells away, well inside the near-danger radius.
    assert_eq!(&inputs[6..9], &[0.08, 1.0, 0.0]);
    // Left: wall five cells away is not near either.
    assert_eq!(&inputs[18..21], &[0.2, 0.0, 0.0]);
    // Up: five cells to the wall.
    assert_eq!(&inputs[0..3], &[0.2, 0.0, 0.0]);
}

#[test]
fn nearby_body_is_danger() {
    let body = [Pos::new(5, 5), Pos::new(5, 6), Pos::new(6, 6)];
    let g = Game::from_parts(GameConfig::default(), body, Dir::Up, Pos::new(20, 0)).unwrap();
    let inputs = brain::encode(&g.observation(), 25);
    // Down-Right diagonal hits the tail one cell away.
    assert_eq!(&inputs[9..12], &[0.04, 0.0, 1.0]);
}

#[test]
fn neural_policy_plugs_into_the_driver() {
    let mut weights = vec![0.0; GENOME_LEN];
    // Output bias favouring Down.
    weights[GENOME_LEN - 3] = 5.0;
    let genome = Genome::try_from(weights).unwrap();
    let mut policy = NeuralPolicy::new(&genome, 25);

    let mut g = Game::new(GameConfig::default().with_seed(8)).unwrap();
    assert_eq!(policy.decide(&g.observation()), Dir::Down);
    episode::tick(&mut g, &mut policy);
    assert_eq!(g.heading(), Dir::Down);
}

#[test]
fn population_evaluation_is_reproducible() {
    let mut rng = SmallRng::seed_from_u64(21);
    let genomes: Vec<Genome> = (0..8).map(|_| Genome::random(&mut rng)).collect();
    let cfg = GameConfig::default();
    let a = evaluate_population(&cfg, &genomes, 400, 1000).unwrap();
    let b = evaluate_population(&cfg, &genomes, 400, 1000).unwrap();
    assert_eq!(a.len(), genomes.len());
    assert_eq!(a, b);
    for r in &a {
        assert!(r.steps <= 400);
        assert!(r.fitness >= 0.0);
    }
}
