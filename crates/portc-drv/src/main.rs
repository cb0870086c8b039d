fn main() {
    if let Err(rendered) = portc_drv::main() {
        eprintln!("{rendered}");
        std::process::exit(1);
    }
}
