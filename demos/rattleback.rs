use gorilla_tops::{
    plot::plot_channels,
    shapes::rattleback::{Rattleback, RattlebackParams},
    simulate::{simulate, Top},
    telemetry::Channel,
};

/// Spin a rattleback the "wrong" way and watch the spin reverse.
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut top = Top::new(Rattleback::new(RattlebackParams::default())?)?;

    simulate(&mut top, 6.0, 1.0 / 60.0)?;

    for (t, wy) in top.samples().series(Channel::AngularVelocityY).iter().step_by(30) {
        println!("t = {:>4.1} s, wy = {:+.3}", t, wy);
    }

    plot_channels(
        top.samples(),
        &Channel::ANGULAR_VELOCITY,
        "rattleback angular velocity",
        "rattleback_angular_velocity.png",
    )?;
    plot_channels(top.samples(), &Channel::ENERGY, "rattleback energy", "rattleback_energy.png")?;
    Ok(())
}
