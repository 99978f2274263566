use gorilla_tops::{
    na::Vector3,
    plot::plot_channels,
    shapes::phi_top::{PhiTop, PhiTopParams},
    simulate::{simulate, Top},
    telemetry::Channel,
    PI,
};

/// Spin a φ-top lying on its side and watch it stand up on its long axis.
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = PhiTopParams {
        initial_spin: 10.0 * PI,
        ..Default::default()
    };
    let mut top = Top::new(PhiTop::new(params)?)?;

    let poses = simulate(&mut top, 5.0, 1.0 / 60.0)?;

    let up = poses[poses.len() - 1].rotation * Vector3::y();
    println!("long axis after 5 s: {:?}", up);

    plot_channels(top.samples(), &Channel::ENERGY, "φ-top energy", "phi_top_energy.png")?;
    plot_channels(
        top.samples(),
        &Channel::ANGULAR_VELOCITY,
        "φ-top angular velocity",
        "phi_top_angular_velocity.png",
    )?;
    Ok(())
}
