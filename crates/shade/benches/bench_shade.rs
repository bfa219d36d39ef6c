use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use gridview_common::{GridParams, PipelineVariant};
use gridview_shade::{FragmentInput, GridShader};

fn fragments(side: usize, spacing: f32) -> Vec<FragmentInput> {
    let camera = Vec3::new(0.0, 10.0, 15.0);
    let d = spacing * 0.5;
    (0..side * side)
        .map(|i| {
            let x = (i % side) as f32 * spacing - side as f32 * spacing * 0.5;
            let z = (i / side) as f32 * spacing - side as f32 * spacing * 0.5;
            FragmentInput::new(Vec3::new(x, 0.0, z), camera)
                .with_derivatives(Vec3::new(d, 0.0, 0.0), Vec3::new(0.0, 0.0, d))
        })
        .collect()
}

fn bench_shade(variant: PipelineVariant, side: usize, iterations: usize) {
    let inputs = fragments(side, 0.01);
    let shader = GridShader::new(GridParams::default(), variant);

    let start = Instant::now();
    let mut alpha_sum = 0.0f32;
    for _ in 0..iterations {
        for input in &inputs {
            alpha_sum += shader.shade(black_box(input)).a;
        }
    }
    let elapsed = start.elapsed();
    let fragments = (inputs.len() * iterations) as u32;
    println!(
        "  shade {variant} ({side}x{side} fragments, {iterations} iters): {:?}/fragment, total {elapsed:?} (alpha sum {alpha_sum:.1})",
        elapsed / fragments
    );
}

fn main() {
    println!("gridview-shade benchmarks");
    for variant in PipelineVariant::ALL {
        bench_shade(variant, 256, 4);
        bench_shade(variant, 1024, 1);
    }
}
