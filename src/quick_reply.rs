/// Trigger phrase (lowercase) and reply, checked in declaration order.
pub const QUICK_REPLIES: &[(&str, &str)] = &[
    ("hi", "<b>Hey there! 👋 Ready to solve some math?</b>"),
    ("hello", "<b>Hello! Let's get solving 📂</b>"),
    ("hii", "<b>Hi! 😊 Please enter your math question.</b>"),
    ("thanks", "<b>You're welcome! Happy to help ✨</b>"),
    ("thank you", "<b>Anytime! 🙌</b>"),
    ("who made you", "<b>I was built by Krishna 🚀</b>"),
    ("who are you", "<b>I'm your friendly AI Math Solver 🤖💡</b>"),
    ("hey", "<b>Hey! 😊 How can I help you today?</b>"),
    ("good morning", "<b>Good morning! ☀️ Ready to solve some problems?</b>"),
    ("good night", "<b>Good night! 🌙 See you soon!</b>"),
    ("bye", "<b>Bye! 👋 Come back for more math help anytime!</b>"),
    ("i love you", "<b>❤️ Aww! I love solving math with you too!</b>"),
    ("help", "<b>Need help? Just ask your math problem or upload an image! 🆘</b>"),
    ("how are you", "<b>I'm great! Thanks for asking 😊</b>"),
    ("yo", "<b>Yo! Ready to do some math magic? 🧠</b>"),
    ("what's up", "<b>Not much! Just chilling and solving equations 😎</b>"),
    ("ok", "<b>Okay! Just drop in your next math challenge 📝</b>"),
    ("cool", "<b>Cool cool! Let's keep going 🔥</b>"),
    ("what can you do", "<b>I can solve math problems, explain steps, read from images, and more! 🧮</b>"),
    ("awesome", "<b>You're awesome too! Let's crack some numbers! 🤩</b>"),
    ("are you real", "<b>I'm real in the digital world 🌐💻</b>"),
    ("thank god", "<b>Haha, I'll take that as a compliment 😄</b>"),
    ("who's your creator", "<b>I was crafted by Krishna! 👨‍💻</b>"),
    ("you are cool", "<b>You're cooler! Let's keep solving 🔥</b>"),
    ("you're smart", "<b>Thanks! I'm trained to be clever at math 😄</b>"),
    ("solve this", "<b>Sure! Just send me the problem 🧮</b>"),
    ("love you", "<b>Back at ya! 💖 Let's conquer those numbers!</b>"),
    ("good evening", "<b>Good evening! 🌇 Let's dive into some math!</b>"),
    ("gm", "<b>GM! ☀️ Hit me with a math question!</b>"),
    ("gn", "<b>GN! 🌙 Dream of numbers!</b>"),
];

/// Return the reply of the first trigger contained in `normalized`.
///
/// `normalized` is expected to be lowercased and trimmed already. This is a
/// plain substring test, so the first entry wins even when a later trigger
/// is a longer match ("hii" answers with the "hi" reply).
pub fn match_reply(normalized: &str) -> Option<&'static str> {
    QUICK_REPLIES
        .iter()
        .find(|(trigger, _)| normalized.contains(trigger))
        .map(|(_, reply)| *reply)
}
