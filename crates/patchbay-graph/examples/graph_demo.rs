//! Demo: build an effects graph definition, instantiate it, mutate a
//! parameter, and re-serialize the definition.
//!
//! ```bash
//! cargo run -p patchbay-graph --example graph_demo
//! ```

use patchbay_core::PatchContext;
use patchbay_graph::{
    EffectFilter, GraphDefBuilder, NodeAttrs, NodeDef, NodeParam, NodeRegistry, RuntimeGraph,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Describe a small chain: input trim → slap delay → output fader.
    let mut builder = GraphDefBuilder::new();
    builder.add_effect(NodeDef::gain("trim").with_attr("stage", "input"))?;
    builder.add_effect(NodeDef::delay("slap"))?;
    builder.add_effect(NodeDef::gain("fader").with_attr("stage", "output"))?;
    builder.connect("trim", "slap")?;
    builder.connect("slap", "fader")?;
    let def = builder.build()?;

    println!("sources: {:?}", def.source_node_ids);
    println!("destinations: {:?}", def.destination_node_ids);

    // Bring the chain to life against a patch context.
    let mut ctx = PatchContext::new(48000.0);
    let registry = NodeRegistry::new();
    let mut graph = RuntimeGraph::instantiate(&def, &mut ctx, &registry)?;

    // Tighten the slap delay and pull the fader down a touch.
    graph.set_param(&mut ctx, "slap", NodeParam::new_constant("delayTime", 0.12))?;
    graph.set_param(&mut ctx, "fader", NodeParam::new_constant("gain", 0.8))?;

    let outputs = graph.find_audio_effects(
        &EffectFilter::any().with_attrs(NodeAttrs::new().with("stage", "output")),
    );
    println!("output stages: {:?}", outputs.iter().map(|n| n.id()).collect::<Vec<_>>());

    // The re-derived definition carries the mutated values and is ready to
    // persist.
    let json = serde_json::to_string_pretty(&graph.to_def())?;
    println!("{json}");

    graph.destroy(&mut ctx)?;
    Ok(())
}
