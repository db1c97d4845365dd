use ad_board_commons::*;

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "warn,ad_board_server=debug");
    }
    start_everything(ad_board_server::entry());
}
