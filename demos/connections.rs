//! Two boxes, a wavy link between them, and a triangle borrowing their corners.
//!
//! Run with `RUST_LOG=debug cargo run --example connections --features tracing`
//! to see frame resolution and fitting decisions on stderr.

use vellum::{
    ConnectionStyle, Coord, DotShape, Endpoint, FitOptions, Parametric, PolygonShape, RectShape,
    RelCoord, Scene, SceneOptions, Vertex,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:?}", miette::Report::new(e));
        std::process::exit(1);
    }
}

fn run() -> vellum::Result<()> {
    let options = SceneOptions {
        background: Some("white".to_string()),
        ..Default::default()
    };
    let mut scene = Scene::with_options(400.0, 240.0, options);

    let left = scene.add(RectShape::relative(RelCoord::new(0.1, 0.3), RelCoord::new(0.2, 0.3)));
    let right = scene.add(RectShape::absolute(Coord::new(260.0, 60.0), 80.0, 50.0));
    scene.rotate(right, 20.0)?;

    let wave = ConnectionStyle::template(Parametric::wave(2.0, 0.08)).with_end_cap("arrow");
    scene.connect((left, "right"), (right, "left"), wave)?;

    let hub = scene.add(DotShape::new(Coord::new(200.0, 200.0)));
    scene.add(PolygonShape::new([
        Vertex::from(hub),
        (left, "bottom_right").into(),
        (right, "bottom_left").into(),
    ]));
    scene.connect(
        hub,
        Endpoint::Canvas.at("bottom"),
        ConnectionStyle::curved(0.5).with_start_cap("diamond"),
    )?;

    // moving the right box drags the wave and the triangle along
    scene.move_by(right, Coord::new(-20.0, 40.0))?;

    let badge = scene.add(RectShape::absolute(Coord::ZERO, 30.0, 10.0));
    let corner = vellum::BBox::from_origin_size(Coord::new(320.0, 10.0), 70.0, 40.0);
    scene.fit_within(badge, corner, FitOptions { match_aspect: true, ..Default::default() })?;

    print!("{}", scene.render()?);
    Ok(())
}
