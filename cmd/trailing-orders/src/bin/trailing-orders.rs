fn main() {
    trailing_orders::main();
}
