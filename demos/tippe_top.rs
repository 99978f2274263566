use gorilla_tops::{
    na::Vector3,
    plot::plot_channels,
    shapes::tippe_top::{TippeTop, TippeTopParams},
    simulate::{simulate, Top},
    telemetry::Channel,
};

/// Spin a tippe-top on its ball and let it turn over onto its peg.
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut top = Top::new(TippeTop::new(TippeTopParams::default())?)?;

    let poses = simulate(&mut top, 10.0, 1.0 / 60.0)?;

    for (i, pose) in poses.iter().enumerate().step_by(60) {
        let axis = pose.rotation * Vector3::y();
        println!("t = {:>4.1} s, symmetry axis y = {:+.3}", i as f64 / 60.0, axis.y);
    }

    plot_channels(top.samples(), &Channel::ENERGY, "tippe-top energy", "tippe_top_energy.png")?;
    plot_channels(
        top.samples(),
        &Channel::ANGULAR_VELOCITY,
        "tippe-top angular velocity",
        "tippe_top_angular_velocity.png",
    )?;
    Ok(())
}
