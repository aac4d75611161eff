fn main() -> Result<(), Box<dyn std::error::Error>> {
    matrix_terminal::cli::main()
}
