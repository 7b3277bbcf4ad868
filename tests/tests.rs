mod matching;
mod set;
