mod game_steps;
mod match_steps;
mod presence_steps;
