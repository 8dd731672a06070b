#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    hadesk_desktop_lib::run()
}
