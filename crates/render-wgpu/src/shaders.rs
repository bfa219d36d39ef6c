/// WGSL shader for the lit sample mesh. Reads only the leading
/// `view_proj` of the shared uniform buffer.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_mesh(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.3;
    let diffuse = max(dot(in.world_normal, light_dir), 0.0);
    let lighting = ambient + diffuse * 0.7;
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// WGSL shader for the procedural grid plane.
///
/// Same arithmetic as `gridview_shade::GridShader`; derivatives come from
/// `dpdx`/`dpdy` instead of neighbour differences.
pub const GRID_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    base_color: vec4<f32>,
    minor_line_color: vec4<f32>,
    major_line_color: vec4<f32>,
    x_axis_color: vec4<f32>,
    z_axis_color: vec4<f32>,
    // major width, minor width, axis width, base alpha
    widths: vec4<f32>,
    // grid div, major divisor, canonical flag, unused
    divisions: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct GridVertex {
    @location(0) position: vec3<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
};

@vertex
fn vs_grid(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    out.clip_position = u.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    return out;
}

// smoothstep with coincident edges defined as a hard step
fn smooth_edge(e0: f32, e1: f32, x: f32) -> f32 {
    if (e0 == e1) {
        return step(e0, x);
    }
    let t = saturate((x - e0) / (e1 - e0));
    return t * t * (3.0 - 2.0 * t);
}

fn line_mask(half_width: f32, aa: f32, dist: f32) -> f32 {
    return 1.0 - smooth_edge(half_width - aa, half_width + aa, dist);
}

fn coverage(nominal: f32, draw: f32) -> f32 {
    if (draw > 0.0) {
        return saturate(nominal / draw);
    }
    return 0.0;
}

fn clamp_ordered(x: f32, lo: f32, hi: f32) -> f32 {
    return min(max(x, lo), hi);
}

fn gradient_magnitude(dx: vec2<f32>, dy: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(length(vec2<f32>(dx.x, dy.x)), length(vec2<f32>(dx.y, dy.y)));
}

fn axis_mask(world_uv: f32, deriv: f32, width: f32) -> f32 {
    let draw = (width + deriv) * 0.5;
    return line_mask(draw, deriv * 1.5, abs(world_uv * 2.0)) * coverage(width, draw);
}

fn major_mask(world_uv: f32, world_deriv: f32, line_width: f32, div: f32) -> f32 {
    let deriv = world_deriv / div;
    let width = line_width / div;
    let draw = clamp_ordered(width, deriv, 0.5);
    let dist = 1.0 - abs(fract(world_uv / div) * 2.0 - 1.0);
    return line_mask(draw, deriv * 1.5, dist) * coverage(width, draw);
}

fn minor_mask(uv: f32, deriv: f32, line_width: f32) -> f32 {
    let invert = line_width > 0.5;
    let nominal = select(line_width, 1.0 - line_width, invert);
    let to_center = abs(fract(uv) * 2.0 - 1.0);
    let dist = select(1.0 - to_center, to_center, invert);
    let draw = clamp_ordered(nominal, deriv, 0.5);
    let m = line_mask(draw, deriv * 1.5, dist) * coverage(nominal, draw);
    return select(m, 1.0 - m, invert);
}

@fragment
fn fs_grid(in: GridOutput) -> @location(0) vec4<f32> {
    let grid_div = u.divisions.x;
    let major_div = u.divisions.y;
    let canonical = u.divisions.z > 0.5;

    let world_uv = in.world_pos.xz * grid_div;
    let uv = (in.world_pos - floor(u.camera_position.xyz)).xz * grid_div;

    let uv_deriv = gradient_magnitude(dpdx(uv), dpdy(uv));
    let world_deriv = gradient_magnitude(dpdx(world_uv), dpdy(world_uv));

    let axis_width = max(u.widths.x, u.widths.z);
    let axis = vec2<f32>(
        axis_mask(world_uv.x, world_deriv.x, axis_width),
        axis_mask(world_uv.y, world_deriv.y, axis_width),
    );
    var major = vec2<f32>(
        major_mask(world_uv.x, world_deriv.x, u.widths.x, major_div),
        major_mask(world_uv.y, world_deriv.y, u.widths.x, major_div),
    );
    var minor = vec2<f32>(
        minor_mask(uv.x, uv_deriv.x, u.widths.y),
        minor_mask(uv.y, uv_deriv.y, u.widths.y),
    );

    let axis_combined = max(axis.x, axis.y);
    if (canonical && axis_combined > 0.0) {
        major = vec2<f32>(0.0);
        minor = vec2<f32>(0.0);
    }

    let minor_combined = mix(minor.x, 1.0, minor.y);
    let major_combined = mix(major.x, 1.0, major.y);

    let grid_color = mix(
        mix(u.base_color.rgb, u.minor_line_color.rgb, minor_combined),
        u.major_line_color.rgb,
        major_combined,
    );

    let crossing = mix(u.x_axis_color.rgb, u.z_axis_color.rgb, 0.5);
    var axis_color = mix(crossing, u.x_axis_color.rgb, step(0.5, abs(world_uv.x)));
    axis_color = mix(axis_color, u.z_axis_color.rgb, step(0.5, abs(world_uv.y)));

    let color = mix(grid_color, axis_color, axis_combined);

    var alpha = u.widths.w;
    if (canonical) {
        if (minor_combined > 0.0) {
            alpha = saturate(mix(alpha, 1.0, minor_combined));
        }
        if (major_combined > 0.0) {
            alpha = saturate(mix(alpha, 1.0, major_combined));
        }
        if (axis_combined > 0.0) {
            alpha = saturate(mix(alpha, 1.0, axis_combined));
        }
    }

    return vec4<f32>(color, saturate(alpha));
}
"#;
