//! Platformer GA CLI - Evolve an action sequence for the demo course.

use std::fs;
use std::path::PathBuf;

use platformer_ga::{
    EvolutionEngine,
    compute::{CourseEnvironment, Environment, evolution::FitnessEvaluator},
    schema::EvolutionConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }

    let mut config_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--output" | "-o" => match rest.next() {
                Some(path) => output_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Error: --output needs a path");
                    std::process::exit(1);
                }
            },
            other if config_path.is_none() => config_path = Some(PathBuf::from(other)),
            other => {
                eprintln!("Error: unexpected argument '{}'", other);
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let config = match &config_path {
        Some(path) => EvolutionConfig::from_path(path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }),
        None => EvolutionConfig::default(),
    };

    println!("Platformer GA");
    println!("=============");
    println!(
        "Population: {} for {} generations",
        config.population.size, config.population.max_generations
    );
    println!(
        "Genome: {} genes, +{} every {} generations",
        config.genome.initial_length, config.growth.increment, config.growth.interval
    );
    println!(
        "Tournament: {}, mutation rate: {}",
        config.selection.tournament_size, config.mutation.rate
    );
    if let Some(seed) = config.random_seed {
        println!("Seed: {}", seed);
    }
    println!();

    let fitness_config = config.fitness.clone();
    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error: invalid configuration: {}", e);
        std::process::exit(1);
    });
    let mut env = CourseEnvironment::default();

    println!("Running evolution...");
    let result = engine
        .run_with_callback(&mut env, |progress| {
            println!(
                "  Generation {}/{}: best={:.4}, gen best={:.4}, avg={:.4}, length={:.0}{}",
                progress.generation + 1,
                progress.total_generations,
                progress.best_fitness,
                progress.generation_best,
                progress.avg_fitness,
                progress.avg_genome_length,
                if progress.grew { " (grew)" } else { "" }
            );
        })
        .unwrap_or_else(|e| {
            eprintln!("Error during evolution: {}", e);
            std::process::exit(1);
        });

    println!();
    println!("Best individual:");
    println!("  Id: {} (generation {})", result.best.id, result.best.generation);
    println!("  Fitness: {:.6}", result.best.fitness);
    println!(
        "  Genes: {} ({} ticks)",
        result.best.length,
        result.best.genome.total_ticks()
    );
    for line in result.best.actions.iter().take(10) {
        println!("    {}", line);
    }
    if result.best.actions.len() > 10 {
        println!("    ... {} more", result.best.actions.len() - 10);
    }
    println!(
        "Time: {:.2}s ({} evaluations, {:.1} evals/s)",
        result.stats.elapsed_seconds,
        result.stats.total_evaluations,
        result.stats.evaluations_per_second
    );

    if let Some(path) = &output_path {
        let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("Error serializing result: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = fs::write(path, json) {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Result written to {}", path.display());
    }

    // Replay the winner once and report where it got to
    let evaluator = FitnessEvaluator::new(fitness_config);
    match evaluator.replay(&mut env, &result.best.genome) {
        Ok(summary) => {
            let state = env.state();
            println!();
            println!("Replay:");
            println!(
                "  Steps: {} ({} rightward){}",
                summary.steps,
                summary.right_moves,
                if summary.terminated { ", ended early" } else { "" }
            );
            println!(
                "  Progress: {}/{}{}",
                summary.progress,
                env.layout().length,
                if env.finished() { " (goal)" } else { "" }
            );
            println!("  Lives: {}, score: {}", state.lives, state.score);
        }
        Err(e) => eprintln!("Error replaying best genome: {}", e),
    }

    if let Err(e) = env.close() {
        eprintln!("Error closing environment: {}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json] [--output best.json]", program);
    eprintln!();
    eprintln!("Evolve an action sequence for the demo course.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Path to evolution configuration (default settings if omitted)");
    eprintln!("  --output     Write the run result as JSON");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn print_example_config() {
    let config = EvolutionConfig {
        random_seed: Some(42),
        ..Default::default()
    };
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
