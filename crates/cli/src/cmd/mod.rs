mod configure;
mod locate;
mod show;
mod units;

pub use configure::cmd_configure;
pub use locate::cmd_locate;
pub use show::cmd_show;
pub use units::cmd_units;
