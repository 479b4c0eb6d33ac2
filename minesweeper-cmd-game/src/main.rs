use std::error::Error;

use clap::Parser;
use minesweeper_agent::runner::{self, Outcome, Step};
use minesweeper_agent::{Agent, Game, GameSetupBuilder, PlayError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

/// Lets the knowledge-based agent play Minesweeper on random boards
#[derive(Parser, Debug)]
#[command(name = "minesweeper-cmd-game")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Board width
  #[arg(long, default_value = "8")]
  width: u32,

  /// Board height
  #[arg(long, default_value = "8")]
  height: u32,

  /// Number of mines placed on each board
  #[arg(short, long, default_value = "8")]
  mines: u32,

  /// Seed for boards and guesses (random if omitted)
  #[arg(short, long)]
  seed: Option<u64>,

  /// Number of games to play
  #[arg(short, long, default_value = "1")]
  games: u32,

  /// Print the board and the agent's view after every move
  #[arg(long)]
  show: bool,
}

fn play_shown(game: &mut Game, agent: &mut Agent) -> Result<Outcome, PlayError> {
  loop {
    println!("{:?}", game);
    println!("{:?}", agent);

    if game.is_win() {
      println!("Win!");
      return Ok(Outcome::Won);
    }

    match runner::step(game, agent)? {
      Step::Safe { cell, revealed } => println!("Opened safe {:?}, revealed {}", cell, revealed.len()),
      Step::Guess { cell, revealed } => {
        println!("No safe move.. guessed {:?}, revealed {}", cell, revealed.len())
      }
      Step::Exploded(cell) => {
        println!("{:?}", game);
        println!("Boom at {:?}!", cell);
        return Ok(Outcome::Lost(cell));
      }
      Step::NoMove => {
        println!("No moves left!");
        return Ok(Outcome::Stuck);
      }
    }
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let cli = Cli::parse();
  let mut seeds = match cli.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };

  let mut wins = 0;
  for game_index in 0..cli.games {
    let mut builder = GameSetupBuilder::with_rng(cli.width, cli.height, Box::new(StdRng::from_rng(&mut seeds)?));
    if !builder.add_random_mines(cli.mines) {
      return Err(format!("{} mines do not fit on a {}x{} board", cli.mines, cli.width, cli.height).into());
    }
    let mut game = Game::from(builder);
    let mut agent = Agent::with_rng(cli.width, cli.height, Box::new(StdRng::from_rng(&mut seeds)?));

    let outcome = if cli.show {
      play_shown(&mut game, &mut agent)?
    } else {
      runner::play(&mut game, &mut agent)?
    };
    tracing::info!(game = game_index, ?outcome, flagged = agent.mines().len(), "game finished");
    if outcome == Outcome::Won {
      wins += 1;
    }
  }

  println!("Won {} of {} games", wins, cli.games);
  Ok(())
}
