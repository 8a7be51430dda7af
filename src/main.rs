//! Demo binary: generate a village, populate it with villagers, and run
//! the simulation for a while, printing the map and a digest of what the
//! villagers got up to.

use clap::Parser;
use hamlet::{
    llm, GenerationConfig, HamletResult, HttpLlmService, LlmService, LlmStrategy,
    LoadModelRequest, MapGenerator, Npc, RandomStrategy, Simulation, StructureKind, WorldPos,
};
use log::{info, warn};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hamlet")]
#[command(about = "Procedural village simulation with LLM-driven villagers")]
struct Args {
    /// Random seed for generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Map width in tiles
    #[arg(long, default_value_t = 40)]
    width: usize,

    /// Map length in tiles
    #[arg(long, default_value_t = 40)]
    length: usize,

    /// Number of villagers to spawn
    #[arg(long, default_value_t = 4)]
    npcs: usize,

    /// Simulation ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: usize,

    /// Seconds of simulated time per tick
    #[arg(long, default_value_t = 0.5)]
    dt: f32,

    /// Inference server base URL; villagers act randomly when omitted
    #[arg(long)]
    server_url: Option<String>,

    /// Print the ASCII occupancy map after generation
    #[arg(long, default_value_t = false)]
    dump_map: bool,
}

#[tokio::main]
async fn main() -> HamletResult<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = GenerationConfig::new(args.seed);
    config.width = args.width;
    config.length = args.length;

    let generator = MapGenerator::with_default_catalogs(config);
    let mut map = generator.generate_map()?;
    if let Some((target, _)) = map.first_of_kind(StructureKind::House) {
        generator.generate_clue(&mut map, target);
    }

    if args.dump_map {
        println!("{}", map.grid.occupancy_dump());
    }
    info!(
        "village ready: {} structures, clue at {:?}",
        map.structures.len(),
        map.clue_tile
    );

    let service: Option<Arc<dyn LlmService>> = match &args.server_url {
        Some(url) => {
            let service: Arc<dyn LlmService> = Arc::new(HttpLlmService::new(url));
            match llm::connect(service.as_ref()).await {
                Ok(true) => Some(service),
                Ok(false) => {
                    warn!("inference server not healthy, falling back to random villagers");
                    None
                }
                Err(e) => {
                    warn!("could not reach inference server ({}), falling back", e);
                    None
                }
            }
        }
        None => None,
    };

    let mut sim = Simulation::new(map);
    sim.set_service_ready(service.is_some());

    for i in 0..args.npcs {
        let name = format!("Villager {}", i + 1);
        let model_id = format!("villager-{}", i + 1);
        let position = WorldPos::new(i as f32 * 4.0 - 8.0, 0.0);
        let strategy: Box<dyn hamlet::DecisionStrategy> = match &service {
            Some(service) => {
                let request = LoadModelRequest::new(&model_id, format!("models/{}.gguf", model_id));
                if let Err(e) = service.load_model(&request).await {
                    warn!("failed to load model for {}: {}", name, e);
                }
                Box::new(LlmStrategy::new(Arc::clone(service), args.seed + i as u64))
            }
            None => Box::new(RandomStrategy::new(args.seed + i as u64)),
        };
        sim.add_npc(Npc::new(name, model_id, position, strategy, args.seed + i as u64));
    }

    for _ in 0..args.ticks {
        sim.tick(args.dt);
        // Spawned inference requests need the runtime between ticks.
        tokio::task::yield_now().await;
    }

    println!(
        "simulated {:.0}s of village life with {} villagers:",
        sim.time(),
        sim.npcs().len()
    );
    for npc in sim.npcs() {
        let doing = npc
            .action_label()
            .unwrap_or_else(|| "nothing in particular".to_string());
        println!(
            "  {}: {} (hunger {:.0}, thirst {:.0}, {} memories)",
            npc.state.name,
            doing,
            npc.state.hunger,
            npc.state.thirst,
            npc.state.memories.len()
        );
    }

    Ok(())
}
