use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

use onirim_core::{Board, ChannelBoundary, Game, GameError, GameMessage, GameState, Prompt};

mod config;

use config::{BoardFormat, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 日志写到 stderr，避免和游戏输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let seed = config.seed;
    let (boundary, mut messages, choices) = ChannelBoundary::channel();

    // 状态机在阻塞线程上运行，通过通道与这里的终端循环交互
    let engine = tokio::task::spawn_blocking(move || {
        let state = match seed {
            Some(seed) => GameState::with_seed(seed),
            None => GameState::new(),
        }?;
        let mut game = Game::new(state, boundary);
        info!(id = %game.id, ?seed, "game started");
        game.run()
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("--- Onirim ---");
    while let Some(msg) = messages.recv().await {
        match msg {
            GameMessage::Status(text) => println!("{}", text),
            GameMessage::Board(board) => print_board(&board, config.board)?,
            GameMessage::Prompt(prompt) => {
                print_prompt(&prompt);
                let Some(key) = read_choice(&mut stdin, &prompt).await? else {
                    println!("Input closed, leaving the game.");
                    break;
                };
                if choices.send(key).await.is_err() {
                    break;
                }
            }
        }
    }

    // 关闭选择通道，让仍在等待输入的状态机退出
    drop(choices);
    match engine.await? {
        Ok(board) if board.won => println!("You found all eight doors. You win!"),
        Ok(_) => println!("The labyrinth closed around you. You lose."),
        Err(GameError::Disconnected) => info!("input closed, game abandoned"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn print_prompt(prompt: &Prompt) {
    println!("{}", prompt.message);
    for choice in &prompt.choices {
        println!("  {}: {}", choice.key, choice.name);
    }
}

fn print_board(board: &Board, format: BoardFormat) -> Result<(), serde_json::Error> {
    match format {
        BoardFormat::Json => println!("{}", serde_json::to_string(board)?),
        BoardFormat::Text => {
            println!();
            println!("Hand    : {}", board.hand.join(" "));
            println!("Row     : {}", board.row.join(" "));
            println!("Discard : {}", board.discard.join(" "));
            println!("Doors   : {}", board.doors.join(" "));
            println!("Deck    : {} cards", board.cards_remaining);
            println!();
        }
    }
    Ok(())
}

/// 读取一行输入，直到它匹配提示中的某个选项。输入结束时返回 `None`。
async fn read_choice(stdin: &mut Lines<BufReader<Stdin>>, prompt: &Prompt) -> std::io::Result<Option<String>> {
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            continue;
        }
        match prompt.choose(&line) {
            Ok(choice) => return Ok(Some(choice.key.clone())),
            Err(err) => println!("{}", err),
        }
    }
}
